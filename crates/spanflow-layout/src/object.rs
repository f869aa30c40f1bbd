//! Inline object model.
//!
//! A block is an ordered list of inline objects (text runs, images and
//! embedded components) plus one text buffer that backs every text run.
//! Fonts, images and components are referenced through copyable handles into
//! registries owned by the caller; the block never owns or mutates them.

use std::ops::Range;

use serde::Serialize;

use crate::color::ColorValue;
use crate::layout::float::FloatSide;

/// Id given to objects the caller did not label.
pub const NO_ID: i32 = -1;

/// Handle to a font in the caller's font registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FontId(pub u32);

/// Handle to an image in the caller's image registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageId(pub u32);

/// Handle to an embedded component in the caller's component registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ComponentId(pub u32);

/// What an inline object contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectKind {
    /// A run of text stored in the block's text buffer.
    Text {
        /// Byte range into the combined text.
        range: Range<usize>,
        /// Font the run is measured and drawn with.
        font: FontId,
        /// Text color.
        color: ColorValue,
    },
    /// An image sized by the object sizer.
    Image {
        /// Image handle.
        image: ImageId,
        /// Distance the image's bottom edge sits below the text baseline.
        baseline_offset: f32,
    },
    /// An embedded component sized by the object sizer and told its final
    /// geometry after layout.
    Component {
        /// Component handle.
        component: ComponentId,
        /// Distance the component's bottom edge sits below the text baseline.
        baseline_offset: f32,
    },
}

/// One entry in the block's object sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineObject {
    /// Content of the object.
    pub kind: ObjectKind,
    /// Float side, or `None` for objects laid out in the inline flow.
    pub float: Option<FloatSide>,
    /// Caller-assigned id; not required to be unique.
    pub id: i32,
}

impl InlineObject {
    /// Whether the object is pulled to a margin instead of flowing inline.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        self.float.is_some()
    }
}

/// Ordered inline objects plus the text buffer backing their text runs.
#[derive(Debug, Clone, Default)]
pub struct ObjectList {
    objects: Vec<InlineObject>,
    text: String,
}

impl ObjectList {
    /// Create an empty object list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
            text: String::new(),
        }
    }

    /// Drop every object and the text buffer.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.text.clear();
    }

    /// Append a text run. Text runs never float.
    pub fn push_text(&mut self, text: &str, font: FontId, color: ColorValue, id: i32) {
        let start = self.text.len();
        self.text.push_str(text);
        self.objects.push(InlineObject {
            kind: ObjectKind::Text {
                range: start..self.text.len(),
                font,
                color,
            },
            float: None,
            id,
        });
    }

    /// Append an image.
    pub fn push_image(
        &mut self,
        image: ImageId,
        baseline_offset: f32,
        float: Option<FloatSide>,
        id: i32,
    ) {
        self.objects.push(InlineObject {
            kind: ObjectKind::Image {
                image,
                baseline_offset,
            },
            float,
            id,
        });
    }

    /// Append an embedded component.
    pub fn push_component(
        &mut self,
        component: ComponentId,
        baseline_offset: f32,
        float: Option<FloatSide>,
        id: i32,
    ) {
        self.objects.push(InlineObject {
            kind: ObjectKind::Component {
                component,
                baseline_offset,
            },
            float,
            id,
        });
    }

    /// Concatenation of all text runs in document order.
    #[must_use]
    pub fn combined_text(&self) -> &str {
        &self.text
    }

    /// Objects in document order.
    #[must_use]
    pub fn objects(&self) -> &[InlineObject] {
        &self.objects
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Byte offset into the combined text at which object `index` begins.
    ///
    /// Non-text objects sit at the end of the text that precedes them.
    #[must_use]
    pub fn text_offset_of(&self, index: usize) -> usize {
        self.objects[..index.min(self.objects.len())]
            .iter()
            .rev()
            .find_map(|object| match &object.kind {
                ObjectKind::Text { range, .. } => Some(range.end),
                _ => None,
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text_skips_non_text() {
        let mut list = ObjectList::new();
        list.push_text("ab", FontId(0), ColorValue::BLACK, NO_ID);
        list.push_image(ImageId(0), 0.0, None, 7);
        list.push_text("cd", FontId(0), ColorValue::BLACK, NO_ID);
        assert_eq!(list.combined_text(), "abcd");
        assert_eq!(list.len(), 3);
        assert_eq!(list.text_offset_of(1), 2);
        assert_eq!(list.text_offset_of(0), 0);
    }

    #[test]
    fn test_text_run_ranges_are_contiguous() {
        let mut list = ObjectList::new();
        list.push_text("hello ", FontId(0), ColorValue::BLACK, 1);
        list.push_text("world", FontId(1), ColorValue::WHITE, 2);
        let ranges: Vec<_> = list
            .objects()
            .iter()
            .filter_map(|o| match &o.kind {
                ObjectKind::Text { range, .. } => Some(range.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(ranges, vec![0..6, 6..11]);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut list = ObjectList::new();
        list.push_text("x", FontId(0), ColorValue::BLACK, NO_ID);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.combined_text(), "");
    }
}
