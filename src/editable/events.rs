//! Edit notifications and the observer lists that receive them.

use crate::geo::{CoordId, LatLng};

use super::feature::FeatureId;
use super::input::PointerEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditEventKind {
    Created,
    Enable,
    Disable,
    Editing,
    DrawingStart,
    DrawingEnd,
    DrawingCommit,
    DrawingCancel,
    DrawingClick,
    DrawingMove,
    DrawingMouseDown,
    DrawingMouseUp,
    VertexClick,
    VertexCtrlClick,
    VertexAltClick,
    VertexShiftClick,
    VertexContextMenu,
    VertexMouseDown,
    VertexDeleted,
    VertexDrag,
    VertexDragStart,
    VertexDragEnd,
    MiddleMarkerMouseDown,
    DragStart,
    Drag,
    DragEnd,
    ShapeDeleted,
    Split,
}

impl EditEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EditEventKind::Created => "editable:created",
            EditEventKind::Enable => "editable:enable",
            EditEventKind::Disable => "editable:disable",
            EditEventKind::Editing => "editable:editing",
            EditEventKind::DrawingStart => "editable:drawing:start",
            EditEventKind::DrawingEnd => "editable:drawing:end",
            EditEventKind::DrawingCommit => "editable:drawing:commit",
            EditEventKind::DrawingCancel => "editable:drawing:cancel",
            EditEventKind::DrawingClick => "editable:drawing:click",
            EditEventKind::DrawingMove => "editable:drawing:move",
            EditEventKind::DrawingMouseDown => "editable:drawing:mousedown",
            EditEventKind::DrawingMouseUp => "editable:drawing:mouseup",
            EditEventKind::VertexClick => "editable:vertex:click",
            EditEventKind::VertexCtrlClick => "editable:vertex:ctrlclick",
            EditEventKind::VertexAltClick => "editable:vertex:altclick",
            EditEventKind::VertexShiftClick => "editable:vertex:shiftclick",
            EditEventKind::VertexContextMenu => "editable:vertex:contextmenu",
            EditEventKind::VertexMouseDown => "editable:vertex:mousedown",
            EditEventKind::VertexDeleted => "editable:vertex:deleted",
            EditEventKind::VertexDrag => "editable:vertex:drag",
            EditEventKind::VertexDragStart => "editable:vertex:dragstart",
            EditEventKind::VertexDragEnd => "editable:vertex:dragend",
            EditEventKind::MiddleMarkerMouseDown => "editable:middlemarker:mousedown",
            EditEventKind::DragStart => "editable:dragstart",
            EditEventKind::Drag => "editable:drag",
            EditEventKind::DragEnd => "editable:dragend",
            EditEventKind::ShapeDeleted => "editable:shape:deleted",
            EditEventKind::Split => "editable:split",
        }
    }

    /// Listeners may veto these through [`EditEvent::cancel`].
    pub fn is_cancellable(&self) -> bool {
        matches!(self, EditEventKind::DrawingClick | EditEventKind::VertexClick)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    pub kind: EditEventKind,
    pub feature: FeatureId,
    pub vertex: Option<CoordId>,
    pub latlng: Option<LatLng>,
    pub pointer: Option<PointerEvent>,
    /// Feature created by the operation (split)
    pub related: Option<FeatureId>,
    cancelled: bool,
}

impl EditEvent {
    pub fn new(kind: EditEventKind, feature: FeatureId) -> Self {
        Self {
            kind,
            feature,
            vertex: None,
            latlng: None,
            pointer: None,
            related: None,
            cancelled: false,
        }
    }

    pub fn with_vertex(mut self, vertex: CoordId, latlng: LatLng) -> Self {
        self.vertex = Some(vertex);
        self.latlng = Some(latlng);
        self
    }

    pub fn with_latlng(mut self, latlng: LatLng) -> Self {
        self.latlng = Some(latlng);
        self
    }

    pub fn with_pointer(mut self, pointer: PointerEvent) -> Self {
        if self.latlng.is_none() {
            self.latlng = Some(pointer.latlng);
        }
        self.pointer = Some(pointer);
        self
    }

    pub fn with_related(mut self, related: FeatureId) -> Self {
        self.related = Some(related);
        self
    }

    /// Veto the default action. Ignored for kinds that are not cancellable.
    pub fn cancel(&mut self) {
        if self.kind.is_cancellable() {
            self.cancelled = true;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

pub type Listener = Box<dyn FnMut(&mut EditEvent) + Send + Sync>;

/// An ordered observer list. Listeners run in registration order.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

impl Listeners {
    pub fn add(&mut self, listener: impl FnMut(&mut EditEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&mut self, event: &mut EditEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
