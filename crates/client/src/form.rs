//! Add/edit form input.
//!
//! The form holds what the user typed; nothing is trusted until it has been
//! parsed into a [`NewPantryItem`] or a [`PantryItemPatch`].

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use pantry_core::DomainError;
use pantry_inventory::{NewPantryItem, PantryItem, PantryItemPatch};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("quantity must be a whole number, got '{0}'")]
    Quantity(String),

    #[error("expiry date must be YYYY-MM-DD or RFC 3339, got '{0}'")]
    ExpiryDate(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Raw form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub category: String,
    pub quantity: String,
    /// `YYYY-MM-DD` (date picker) or a full RFC 3339 timestamp.
    pub expiry_date: String,
    pub user_id: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            quantity: "1".to_string(),
            expiry_date: String::new(),
            user_id: String::new(),
        }
    }
}

impl ItemForm {
    /// Pre-fill the form for editing `item`.
    pub fn from_item(item: &PantryItem) -> Self {
        Self {
            name: item.name().to_string(),
            category: item.category().to_string(),
            quantity: item.quantity().to_string(),
            expiry_date: item.expiry_date().format("%Y-%m-%d").to_string(),
            user_id: item.user_id().to_string(),
        }
    }

    /// Parse for the add flow; `now` becomes the added date.
    pub fn into_new_item(self, now: DateTime<Utc>) -> Result<NewPantryItem, FormError> {
        let item = NewPantryItem {
            quantity: parse_quantity(&self.quantity)?,
            expiry_date: parse_date(&self.expiry_date)?,
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            added_date: now,
            user_id: self.user_id.trim().to_string(),
        };
        item.validate()?;
        Ok(item)
    }

    /// Parse for the edit flow: every editable field is written, the added
    /// date is left alone.
    pub fn into_patch(self) -> Result<PantryItemPatch, FormError> {
        let patch = PantryItemPatch {
            name: Some(self.name.trim().to_string()),
            category: Some(self.category.trim().to_string()),
            quantity: Some(parse_quantity(&self.quantity)?),
            expiry_date: Some(parse_date(&self.expiry_date)?),
            user_id: Some(self.user_id.trim().to_string()),
        };
        patch.validate()?;
        Ok(patch)
    }
}

fn parse_quantity(raw: &str) -> Result<u32, FormError> {
    raw.trim()
        .parse()
        .map_err(|_| FormError::Quantity(raw.to_string()))
}

/// A bare date means midnight UTC of that day.
fn parse_date(raw: &str) -> Result<DateTime<Utc>, FormError> {
    let raw_trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw_trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw_trimmed)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| FormError::ExpiryDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pantry_core::PantryItemId;

    fn test_form() -> ItemForm {
        ItemForm {
            name: " Milk ".to_string(),
            category: "Dairy".to_string(),
            quantity: "2".to_string(),
            expiry_date: "2024-01-01".to_string(),
            user_id: "alice".to_string(),
        }
    }

    #[test]
    fn new_item_takes_now_as_added_date() {
        let now = Utc.with_ymd_and_hms(2023, 12, 1, 8, 30, 0).unwrap();
        let item = test_form().into_new_item(now).unwrap();

        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.expiry_date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(item.added_date, now);
    }

    #[test]
    fn rfc3339_dates_are_accepted() {
        let mut form = test_form();
        form.expiry_date = "2024-01-01T12:00:00+02:00".to_string();
        let patch = form.into_patch().unwrap();
        assert_eq!(
            patch.expiry_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn patch_writes_every_editable_field() {
        let patch = test_form().into_patch().unwrap();
        assert_eq!(
            patch.field_paths(),
            vec!["name", "category", "quantity", "expiryDate", "userId"]
        );
    }

    #[test]
    fn bad_input_is_rejected() {
        let now = Utc::now();

        let mut form = test_form();
        form.quantity = "-1".to_string();
        assert!(matches!(form.into_new_item(now), Err(FormError::Quantity(_))));

        let mut form = test_form();
        form.expiry_date = "next week".to_string();
        assert!(matches!(form.into_patch(), Err(FormError::ExpiryDate(_))));

        let mut form = test_form();
        form.category = "   ".to_string();
        assert!(matches!(form.into_new_item(now), Err(FormError::Invalid(_))));
    }

    #[test]
    fn from_item_round_trips_through_the_form() {
        let added = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let item = PantryItem::new(
            "x1".parse::<PantryItemId>().unwrap(),
            test_form().into_new_item(added).unwrap(),
        );

        let form = ItemForm::from_item(&item);
        assert_eq!(form.expiry_date, "2024-01-01");
        assert_eq!(form.quantity, "2");

        let patched = item.patched(&form.into_patch().unwrap());
        assert_eq!(patched, item);
    }
}
