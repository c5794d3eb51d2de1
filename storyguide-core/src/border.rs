//! Border width panel state.
//!
//! The panel edits the border of every selected element at once. Values the
//! selection disagrees on show as [`FieldValue::Mixed`]. Each edit produces a
//! [`BorderPatch`], which [`push_update_for_border`] merges into the selection.

use crate::types::{positive, Element};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Border {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub locked_width: bool,
    /// Other border settings (`color`, ...) carried through width edits
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

pub const DEFAULT_BORDER: Border = Border {
    left: 0.0,
    top: 0.0,
    right: 0.0,
    bottom: 0.0,
    locked_width: true,
    extra: BTreeMap::new(),
};

impl Default for Border {
    fn default() -> Self {
        DEFAULT_BORDER
    }
}

/// A value shared by the whole selection, or `Mixed` when elements disagree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<T> {
    Value(T),
    Mixed,
}

impl<T: Copy> FieldValue<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            FieldValue::Value(v) => Some(*v),
            FieldValue::Mixed => None,
        }
    }
}

fn common_value<T, I>(mut values: I, fallback: T) -> FieldValue<T>
where
    T: PartialEq + Copy,
    I: Iterator<Item = T>,
{
    let Some(first) = values.next() else {
        return FieldValue::Value(fallback);
    };
    if values.all(|v| v == first) {
        FieldValue::Value(first)
    } else {
        FieldValue::Mixed
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderState {
    pub left: FieldValue<f64>,
    pub top: FieldValue<f64>,
    pub right: FieldValue<f64>,
    pub bottom: FieldValue<f64>,
    pub locked_width: FieldValue<bool>,
}

impl BorderState {
    /// Locked only if every selected element has the lock on
    pub fn lock_border(&self) -> bool {
        self.locked_width == FieldValue::Value(true)
    }

    pub fn side(&self, side: BorderSide) -> FieldValue<f64> {
        match side {
            BorderSide::Left => self.left,
            BorderSide::Top => self.top,
            BorderSide::Right => self.right,
            BorderSide::Bottom => self.bottom,
        }
    }
}

/// Border values common to the selection. Elements without a border count as
/// [`DEFAULT_BORDER`].
pub fn common_border(elements: &[Element]) -> BorderState {
    let borders: Vec<Border> = elements
        .iter()
        .map(|e| e.border.clone().unwrap_or(DEFAULT_BORDER))
        .collect();

    BorderState {
        left: common_value(borders.iter().map(|b| b.left), DEFAULT_BORDER.left),
        top: common_value(borders.iter().map(|b| b.top), DEFAULT_BORDER.top),
        right: common_value(borders.iter().map(|b| b.right), DEFAULT_BORDER.right),
        bottom: common_value(borders.iter().map(|b| b.bottom), DEFAULT_BORDER.bottom),
        locked_width: common_value(
            borders.iter().map(|b| b.locked_width),
            DEFAULT_BORDER.locked_width,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl BorderSide {
    pub const ALL: [BorderSide; 4] = [
        BorderSide::Left,
        BorderSide::Top,
        BorderSide::Right,
        BorderSide::Bottom,
    ];

    pub fn caption(&self) -> &'static str {
        match self {
            BorderSide::Left => "Left",
            BorderSide::Top => "Top",
            BorderSide::Right => "Right",
            BorderSide::Bottom => "Bottom",
        }
    }

    pub fn aria_label(&self) -> &'static str {
        match self {
            BorderSide::Left => "Edit: Left border",
            BorderSide::Top => "Edit: Top border",
            BorderSide::Right => "Edit: Right border",
            BorderSide::Bottom => "Edit: Bottom border",
        }
    }
}

/// One numeric input in the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderField {
    /// `None` for the single combined field shown while locked
    pub side: Option<BorderSide>,
    pub aria_label: &'static str,
    pub caption: Option<&'static str>,
    pub value: FieldValue<f64>,
}

/// Partial border update; `None` fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BorderPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub locked_width: Option<bool>,
}

impl BorderPatch {
    fn all_sides(value: f64) -> Self {
        Self {
            left: Some(value),
            top: Some(value),
            right: Some(value),
            bottom: Some(value),
            locked_width: None,
        }
    }

    fn one_side(side: BorderSide, value: f64) -> Self {
        let mut patch = Self::default();
        match side {
            BorderSide::Left => patch.left = Some(value),
            BorderSide::Top => patch.top = Some(value),
            BorderSide::Right => patch.right = Some(value),
            BorderSide::Bottom => patch.bottom = Some(value),
        }
        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, border: &Border) -> Border {
        Border {
            left: self.left.unwrap_or(border.left),
            top: self.top.unwrap_or(border.top),
            right: self.right.unwrap_or(border.right),
            bottom: self.bottom.unwrap_or(border.bottom),
            locked_width: self.locked_width.unwrap_or(border.locked_width),
            extra: border.extra.clone(),
        }
    }
}

/// Widths are clamped at zero; non-finite input is dropped
fn sanitize_width(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(positive(value).unwrap_or(0.0))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderWidthControls {
    state: BorderState,
}

impl BorderWidthControls {
    pub fn new(selected_elements: &[Element]) -> Self {
        Self {
            state: common_border(selected_elements),
        }
    }

    pub fn state(&self) -> &BorderState {
        &self.state
    }

    /// Inputs to render: one combined field when locked, four otherwise
    pub fn fields(&self) -> Vec<BorderField> {
        if self.state.lock_border() {
            return vec![BorderField {
                side: None,
                aria_label: "Edit: Border width",
                caption: None,
                value: self.state.left,
            }];
        }

        BorderSide::ALL
            .iter()
            .map(|&side| BorderField {
                side: Some(side),
                aria_label: side.aria_label(),
                caption: Some(side.caption()),
                value: self.state.side(side),
            })
            .collect()
    }

    /// Patch for a value typed into one of the inputs. While locked every edit
    /// moves all four sides together.
    pub fn edit(&self, side: BorderSide, value: f64) -> BorderPatch {
        let Some(value) = sanitize_width(value) else {
            return BorderPatch::default();
        };

        if self.state.lock_border() {
            BorderPatch::all_sides(value)
        } else {
            BorderPatch::one_side(side, value)
        }
    }

    /// Patch for clicking the lock toggle. Turning the lock on copies the
    /// left width to the other three sides when left is not mixed.
    pub fn toggle_lock(&self) -> BorderPatch {
        let lock_border = self.state.lock_border();
        let mut patch = BorderPatch {
            locked_width: Some(!lock_border),
            ..BorderPatch::default()
        };

        if !lock_border {
            if let Some(left) = self.state.left.value() {
                patch.top = Some(left);
                patch.right = Some(left);
                patch.bottom = Some(left);
            }
        }

        patch
    }
}

/// Merge `patch` into the border of every selected element, starting from
/// [`DEFAULT_BORDER`] for elements that have none.
pub fn push_update_for_border(elements: &mut [Element], patch: &BorderPatch) {
    if patch.is_empty() {
        return;
    }
    for element in elements.iter_mut() {
        let base = element.border.take().unwrap_or(DEFAULT_BORDER);
        element.border = Some(patch.apply_to(&base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementType;

    fn shape(id: u64, border: Option<Border>) -> Element {
        let mut element = Element::new(id, ElementType::Shape);
        element.border = border;
        element
    }

    fn unlocked(left: f64, top: f64, right: f64, bottom: f64) -> Border {
        Border {
            left,
            top,
            right,
            bottom,
            locked_width: false,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn missing_border_reads_as_default() {
        let state = common_border(&[shape(1, None)]);
        assert_eq!(state.left, FieldValue::Value(0.0));
        assert!(state.lock_border());
    }

    #[test]
    fn disagreeing_values_are_mixed() {
        let state = common_border(&[
            shape(1, Some(unlocked(2.0, 1.0, 1.0, 1.0))),
            shape(2, Some(unlocked(3.0, 1.0, 1.0, 1.0))),
        ]);
        assert_eq!(state.left, FieldValue::Mixed);
        assert_eq!(state.top, FieldValue::Value(1.0));
    }

    #[test]
    fn lock_needs_every_element_locked() {
        let state = common_border(&[
            shape(1, None),
            shape(2, Some(unlocked(0.0, 0.0, 0.0, 0.0))),
        ]);
        assert_eq!(state.locked_width, FieldValue::Mixed);
        assert!(!state.lock_border());
    }

    #[test]
    fn locked_panel_shows_one_field_and_moves_all_sides() {
        let controls = BorderWidthControls::new(&[shape(1, None)]);
        let fields = controls.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].aria_label, "Edit: Border width");

        let patch = controls.edit(BorderSide::Left, 4.0);
        assert_eq!(patch, BorderPatch::all_sides(4.0));
    }

    #[test]
    fn unlocked_panel_edits_one_side() {
        let controls = BorderWidthControls::new(&[shape(1, Some(unlocked(1.0, 2.0, 3.0, 4.0)))]);
        let fields = controls.fields();
        let labels: Vec<_> = fields.iter().map(|f| f.aria_label).collect();
        assert_eq!(
            labels,
            vec![
                "Edit: Left border",
                "Edit: Top border",
                "Edit: Right border",
                "Edit: Bottom border"
            ]
        );
        assert_eq!(fields[2].value, FieldValue::Value(3.0));

        let patch = controls.edit(BorderSide::Top, 7.0);
        assert_eq!(
            patch,
            BorderPatch {
                top: Some(7.0),
                ..BorderPatch::default()
            }
        );
    }

    #[test]
    fn locking_unifies_to_left() {
        let controls = BorderWidthControls::new(&[shape(1, Some(unlocked(5.0, 1.0, 2.0, 3.0)))]);
        let patch = controls.toggle_lock();
        assert_eq!(patch.locked_width, Some(true));
        assert_eq!(patch.top, Some(5.0));
        assert_eq!(patch.right, Some(5.0));
        assert_eq!(patch.bottom, Some(5.0));
        assert_eq!(patch.left, None);
    }

    #[test]
    fn unlocking_keeps_widths() {
        let controls = BorderWidthControls::new(&[shape(1, None)]);
        assert_eq!(
            controls.toggle_lock(),
            BorderPatch {
                locked_width: Some(false),
                ..BorderPatch::default()
            }
        );
    }

    #[test]
    fn locking_with_mixed_left_only_flips_the_lock() {
        let controls = BorderWidthControls::new(&[
            shape(1, Some(unlocked(1.0, 0.0, 0.0, 0.0))),
            shape(2, Some(unlocked(2.0, 0.0, 0.0, 0.0))),
        ]);
        let patch = controls.toggle_lock();
        assert_eq!(patch.locked_width, Some(true));
        assert_eq!(patch.top, None);
    }

    #[test]
    fn invalid_widths_are_sanitized() {
        let controls = BorderWidthControls::new(&[shape(1, None)]);
        assert!(controls.edit(BorderSide::Left, f64::NAN).is_empty());
        assert_eq!(controls.edit(BorderSide::Left, -3.0), BorderPatch::all_sides(0.0));
    }

    #[test]
    fn push_update_merges_into_selection() {
        let mut elements = vec![
            shape(1, None),
            shape(2, Some(unlocked(1.0, 1.0, 1.0, 1.0))),
        ];
        let patch = BorderPatch {
            right: Some(6.0),
            ..BorderPatch::default()
        };
        push_update_for_border(&mut elements, &patch);

        assert_eq!(
            elements[0].border,
            Some(Border {
                right: 6.0,
                ..DEFAULT_BORDER
            })
        );
        assert_eq!(elements[1].border, Some(unlocked(1.0, 1.0, 6.0, 1.0)));
    }

    #[test]
    fn width_edits_keep_other_border_settings() {
        let mut border = unlocked(1.0, 1.0, 1.0, 1.0);
        border.extra.insert("color".to_string(), serde_json::json!({"r": 255, "g": 0, "b": 0}));
        let mut elements = vec![shape(1, Some(border))];

        let patch = BorderWidthControls::new(&elements).edit(BorderSide::Bottom, 3.0);
        push_update_for_border(&mut elements, &patch);

        let updated = elements[0].border.as_ref().unwrap();
        assert_eq!(updated.bottom, 3.0);
        assert_eq!(updated.extra["color"]["r"], 255);
    }
}
