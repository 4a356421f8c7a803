use super::item::Placement;
use super::Arranger;
use crate::{calc_geometry_attachment, ArrangeFlags, Result, VePath, VisualElement, VisualElementFlags};

impl Arranger<'_> {
    /// Hang the attachments of a node's item along its top edge
    pub(crate) fn arrange_attachments(&mut self, node: &VisualElement) -> Result<Vec<VePath>> {
        let store = self.store;
        let parent_size_bl = self.node_size_bl(node);
        let mut paths = Vec::new();
        for (index, attachment) in store.attachments_of(node.display_item.id()).enumerate() {
            let geometry =
                calc_geometry_attachment(self.config, store, attachment, node.bounds_px, parent_size_bl, index);
            let placement = Placement::new(geometry, ArrangeFlags::NONE, VisualElementFlags::ATTACHMENT);
            paths.push(self.arrange_item(attachment, &node.path, placement)?);
        }
        Ok(paths)
    }
}
