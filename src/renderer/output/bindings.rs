//! Binding Table
//!
//! Logical record of which surfaces are currently bound where: color targets,
//! depth target, fragment-stage inputs, compute-stage inputs, and compute
//! storage outputs. The output manager's phase operations mutate this table
//! and passes consult it when building their pass descriptors, so a surface
//! can never be simultaneously read and written by accident. The table holds
//! surface identities only, never GPU handles, which keeps the phase state
//! machine testable without a device.

use smallvec::SmallVec;

use super::layout::SurfaceId;

/// Current read/write binding state, at surface granularity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BindingTable {
    color_targets: SmallVec<[SurfaceId; 4]>,
    depth_target: Option<SurfaceId>,
    fragment_inputs: SmallVec<[SurfaceId; 8]>,
    compute_inputs: SmallVec<[SurfaceId; 8]>,
    compute_outputs: SmallVec<[SurfaceId; 4]>,
    back_buffer_target: bool,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- write targets ------------------------------------------------------

    /// Replaces the color targets. A surface bound for write is dropped from
    /// both read stages first.
    pub fn set_color_targets(&mut self, targets: &[SurfaceId]) {
        for &id in targets {
            self.unbind_input(id);
        }
        self.color_targets = targets.iter().copied().collect();
        self.back_buffer_target = false;
    }

    pub fn set_depth_target(&mut self, target: Option<SurfaceId>) {
        if let Some(id) = target {
            self.unbind_input(id);
        }
        self.depth_target = target;
    }

    /// Targets the presentation surface instead of an intermediate one.
    pub fn set_back_buffer_target(&mut self) {
        self.color_targets.clear();
        self.depth_target = None;
        self.back_buffer_target = true;
    }

    /// Drops every write binding (color, depth, storage, back buffer).
    pub fn clear_write_targets(&mut self) {
        self.color_targets.clear();
        self.depth_target = None;
        self.compute_outputs.clear();
        self.back_buffer_target = false;
    }

    // -- read inputs --------------------------------------------------------

    /// Binds `inputs` for fragment-stage reads, evicting any write binding.
    pub fn bind_fragment_inputs(&mut self, inputs: &[SurfaceId]) {
        for &id in inputs {
            self.unbind_target(id);
            if !self.fragment_inputs.contains(&id) {
                self.fragment_inputs.push(id);
            }
        }
    }

    /// Binds `inputs` for compute-stage reads, evicting any write binding.
    pub fn bind_compute_inputs(&mut self, inputs: &[SurfaceId]) {
        for &id in inputs {
            self.unbind_target(id);
            if !self.compute_inputs.contains(&id) {
                self.compute_inputs.push(id);
            }
        }
    }

    pub fn unbind_fragment_inputs(&mut self, inputs: &[SurfaceId]) {
        self.fragment_inputs.retain(|id| !inputs.contains(id));
    }

    pub fn unbind_compute_inputs(&mut self, inputs: &[SurfaceId]) {
        self.compute_inputs.retain(|id| !inputs.contains(id));
    }

    /// Drops `id` from both read stages.
    pub fn unbind_input(&mut self, id: SurfaceId) {
        self.fragment_inputs.retain(|i| *i != id);
        self.compute_inputs.retain(|i| *i != id);
    }

    // -- compute outputs ----------------------------------------------------

    /// Binds `outputs` as compute storage targets, evicting read bindings.
    pub fn set_compute_outputs(&mut self, outputs: &[SurfaceId]) {
        for &id in outputs {
            self.unbind_input(id);
        }
        self.compute_outputs = outputs.iter().copied().collect();
    }

    pub fn clear_compute_outputs(&mut self) {
        self.compute_outputs.clear();
    }

    // -- queries ------------------------------------------------------------

    #[must_use]
    pub fn color_targets(&self) -> &[SurfaceId] {
        &self.color_targets
    }

    #[must_use]
    pub fn depth_target(&self) -> Option<SurfaceId> {
        self.depth_target
    }

    #[must_use]
    pub fn fragment_inputs(&self) -> &[SurfaceId] {
        &self.fragment_inputs
    }

    #[must_use]
    pub fn compute_inputs(&self) -> &[SurfaceId] {
        &self.compute_inputs
    }

    #[must_use]
    pub fn compute_outputs(&self) -> &[SurfaceId] {
        &self.compute_outputs
    }

    #[must_use]
    pub fn back_buffer_is_target(&self) -> bool {
        self.back_buffer_target
    }

    #[must_use]
    pub fn is_write_target(&self, id: SurfaceId) -> bool {
        self.color_targets.contains(&id)
            || self.depth_target == Some(id)
            || self.compute_outputs.contains(&id)
    }

    #[must_use]
    pub fn is_read_input(&self, id: SurfaceId) -> bool {
        self.fragment_inputs.contains(&id) || self.compute_inputs.contains(&id)
    }

    fn unbind_target(&mut self, id: SurfaceId) {
        self.color_targets.retain(|t| *t != id);
        if self.depth_target == Some(id) {
            self.depth_target = None;
        }
        self.compute_outputs.retain(|t| *t != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_bind_evicts_read_bind() {
        let mut table = BindingTable::new();
        table.bind_fragment_inputs(&[SurfaceId::GBufferNormal]);
        table.set_color_targets(&[SurfaceId::GBufferNormal]);
        assert!(!table.is_read_input(SurfaceId::GBufferNormal));
        assert!(table.is_write_target(SurfaceId::GBufferNormal));
    }

    #[test]
    fn read_bind_evicts_write_bind() {
        let mut table = BindingTable::new();
        table.set_color_targets(&[SurfaceId::Hdr]);
        table.bind_compute_inputs(&[SurfaceId::Hdr]);
        assert!(!table.is_write_target(SurfaceId::Hdr));
        assert!(table.is_read_input(SurfaceId::Hdr));
    }

    #[test]
    fn back_buffer_target_clears_intermediate_targets() {
        let mut table = BindingTable::new();
        table.set_color_targets(&[SurfaceId::Hdr]);
        table.set_depth_target(Some(SurfaceId::GBufferDepth));
        table.set_back_buffer_target();
        assert!(table.color_targets().is_empty());
        assert_eq!(table.depth_target(), None);
        assert!(table.back_buffer_is_target());
    }

    #[test]
    fn unbinding_an_input_spares_other_surfaces() {
        let mut table = BindingTable::new();
        table.bind_fragment_inputs(&[SurfaceId::Hdr, SurfaceId::GBufferNormal]);
        table.bind_compute_inputs(&[SurfaceId::Hdr]);
        table.unbind_input(SurfaceId::Hdr);
        assert!(!table.is_read_input(SurfaceId::Hdr));
        assert!(table.is_read_input(SurfaceId::GBufferNormal));
    }

    #[test]
    fn read_bind_evicts_storage_outputs() {
        let mut table = BindingTable::new();
        table.set_compute_outputs(&[SurfaceId::PostProcessHdr1]);
        table.bind_compute_inputs(&[SurfaceId::PostProcessHdr1]);
        assert!(!table.is_write_target(SurfaceId::PostProcessHdr1));
        assert!(table.is_read_input(SurfaceId::PostProcessHdr1));
    }

    #[test]
    fn duplicate_reads_are_not_recorded_twice() {
        let mut table = BindingTable::new();
        table.bind_fragment_inputs(&[SurfaceId::Hdr]);
        table.bind_fragment_inputs(&[SurfaceId::Hdr]);
        assert_eq!(table.fragment_inputs().len(), 1);
    }
}
