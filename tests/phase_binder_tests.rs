//! Phase-binding state machine walks, without a GPU device.

use ember::renderer::output::gbuffer::{PackerBinder, PackerState};
use ember::renderer::output::{PhaseBinder, SurfaceId};

const GBUFFER: [SurfaceId; 4] = [
    SurfaceId::GBufferBaseColor,
    SurfaceId::GBufferMaterial,
    SurfaceId::GBufferNormal,
    SurfaceId::GBufferDepth,
];

#[test]
fn deferred_frame_walk_never_reads_and_writes_the_same_surface() {
    let mut binder = PhaseBinder::new(false);
    binder.bind_begin();
    assert!(binder.take_clear_pending());

    binder.bind_begin_gbuffer();
    for id in GBUFFER {
        assert!(binder.bindings().is_write_target(id));
        assert!(!binder.bindings().is_read_input(id));
    }
    binder.bind_end_gbuffer();

    binder.bind_begin_deferred();
    for id in GBUFFER {
        assert!(binder.bindings().is_read_input(id));
        assert!(!binder.bindings().is_write_target(id));
    }
    assert!(binder.bindings().is_write_target(SurfaceId::Hdr));
    binder.bind_end_deferred();

    binder.bind_begin_forward();
    assert!(binder.bindings().is_write_target(SurfaceId::Hdr));
    assert!(binder.bindings().is_write_target(SurfaceId::GBufferNormal));
    assert_eq!(binder.bindings().depth_target(), Some(SurfaceId::GBufferDepth));
    binder.bind_end_forward();

    binder.bind_begin_resolve();
    assert!(binder.bindings().is_read_input(SurfaceId::Hdr));
    assert!(binder.bindings().is_write_target(SurfaceId::PostProcessHdr0));
    binder.bind_end_resolve();

    binder.bind_begin_post_processing();
    binder.bind_ping_pong();
    binder.bind_end();
    assert!(binder.bindings().back_buffer_is_target());
}

#[test]
fn ping_pong_parity_decides_the_composite_source() {
    for dispatches in 0..5 {
        let mut binder = PhaseBinder::new(false);
        binder.bind_begin();
        for _ in 0..dispatches {
            binder.bind_ping_pong();
        }
        binder.bind_end();
        let expected = if dispatches % 2 == 0 {
            SurfaceId::PostProcessHdr0
        } else {
            SurfaceId::PostProcessHdr1
        };
        assert_eq!(binder.post_process_source(), expected, "after {dispatches}");
        assert!(binder.bindings().is_read_input(expected));
    }
}

#[test]
fn rebinding_a_phase_twice_is_idempotent() {
    let mut binder = PhaseBinder::new(true);
    binder.bind_begin();
    binder.take_clear_pending();
    binder.bind_begin_gbuffer();
    let once = binder.bindings().clone();
    binder.bind_begin_gbuffer();
    assert_eq!(binder.bindings(), &once);
}

#[test]
fn packer_states_fully_undo_each_other() {
    let mut packer = PackerBinder::default();
    assert_eq!(packer.state(), PackerState::Unbound);

    packer.bind_packing();
    assert_eq!(packer.state(), PackerState::Packing);
    assert!(packer.take_clear_pending());
    for id in GBUFFER {
        assert!(packer.bindings().is_write_target(id));
    }

    packer.bind_unpacking();
    assert_eq!(packer.state(), PackerState::Unpacking);
    for id in GBUFFER {
        assert!(packer.bindings().is_read_input(id));
        assert!(!packer.bindings().is_write_target(id));
    }

    packer.bind_restore();
    assert_eq!(packer.state(), PackerState::Unbound);
    for id in GBUFFER {
        assert!(!packer.bindings().is_read_input(id));
        assert!(!packer.bindings().is_write_target(id));
    }
    assert!(packer.bindings().back_buffer_is_target());
}
