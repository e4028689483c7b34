//! Form mode state machine for the modal editor.
//!
//! A store's modal form operates in one of three modes. The mode determines
//! which controls the hosting form renders and whether submission is
//! meaningful; the store itself only transports it.

use serde::{Deserialize, Serialize};

/// Presentation mode of the modal form.
///
/// Set by [`open_modal`](crate::EntityStore::open_modal) together with the
/// record the form shows, or independently via
/// [`set_form_mode`](crate::EntityStore::set_form_mode) when a host promotes
/// a read-only view into an editor in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    /// Read-only detail view of an existing record.
    #[default]
    View,

    /// Blank form for a record that does not exist yet.
    Create,

    /// Editable form pre-filled from an existing record.
    Edit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_view() {
        assert_eq!(FormMode::default(), FormMode::View);
    }

    #[test]
    fn modes_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&FormMode::Edit).unwrap(), "\"edit\"");
        let back: FormMode = serde_json::from_str("\"create\"").unwrap();
        assert_eq!(back, FormMode::Create);
    }
}
