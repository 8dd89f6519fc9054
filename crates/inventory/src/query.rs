//! Filter/sort pipeline behind the item list.
//!
//! Search is client-side: the full item set is fetched, then [`view`] keeps
//! the items matching the free-text query and orders them by the selected
//! [`SortKey`]. The secondary line shown under each item comes from
//! [`secondary_label`], which uses the same matching precedence as the filter.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pantry_core::DomainError;

use crate::item::{PantryItem, format_timestamp};

/// Ordering applied to the filtered list.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Order by name.
    #[default]
    None,
    Category,
    ExpiryDate,
    AddedDate,
    UserId,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::None,
        SortKey::Category,
        SortKey::ExpiryDate,
        SortKey::AddedDate,
        SortKey::UserId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Category => "category",
            SortKey::ExpiryDate => "expiryDate",
            SortKey::AddedDate => "addedDate",
            SortKey::UserId => "userId",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    /// Accepts the stored spelling (`expiryDate`) as well as `expiry-date` and
    /// `expiry_date`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "" | "none" | "name" => Ok(SortKey::None),
            "category" => Ok(SortKey::Category),
            "expirydate" => Ok(SortKey::ExpiryDate),
            "addeddate" => Ok(SortKey::AddedDate),
            "userid" => Ok(SortKey::UserId),
            _ => Err(DomainError::UnknownSortKey(s.to_string())),
        }
    }
}

/// Which field of an item satisfied the search query.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MatchedField {
    Name,
    Category,
    UserId,
}

/// Secondary fields only count as a match when the query covers at least
/// half of the field, so two letters do not pull in every long category or
/// user id that happens to contain them.
fn long_enough(query_lower: &str, field: &str) -> bool {
    2 * query_lower.chars().count() >= field.chars().count()
}

fn contains_ci(field: &str, query_lower: &str) -> bool {
    field.to_lowercase().contains(query_lower)
}

/// First field matching `query`, in precedence order name, category, user id.
///
/// Returns `None` for an empty query; callers treat that as "no search".
pub fn match_field(item: &PantryItem, query: &str) -> Option<MatchedField> {
    if query.is_empty() {
        return None;
    }
    let q = query.to_lowercase();

    if contains_ci(item.name(), &q) {
        Some(MatchedField::Name)
    } else if long_enough(&q, item.category()) && contains_ci(item.category(), &q) {
        Some(MatchedField::Category)
    } else if long_enough(&q, item.user_id()) && contains_ci(item.user_id(), &q) {
        Some(MatchedField::UserId)
    } else {
        None
    }
}

/// Whether `item` belongs in the list for `query` (everything passes an empty query).
pub fn matches(item: &PantryItem, query: &str) -> bool {
    query.is_empty() || match_field(item, query).is_some()
}

/// Stable in-place sort by `sort_key`; equal keys keep their input order.
pub fn sort_items(items: &mut [PantryItem], sort_key: SortKey) {
    match sort_key {
        SortKey::None => items.sort_by_cached_key(|i| i.name().to_lowercase()),
        SortKey::Category => items.sort_by_cached_key(|i| i.category().to_lowercase()),
        SortKey::UserId => items.sort_by_cached_key(|i| i.user_id().to_lowercase()),
        SortKey::ExpiryDate => items.sort_by_key(|i| i.expiry_date()),
        SortKey::AddedDate => items.sort_by_key(|i| i.added_date()),
    }
}

/// The ordered, filtered list shown to the user.
pub fn view(items: &[PantryItem], query: &str, sort_key: SortKey) -> Vec<PantryItem> {
    let mut visible: Vec<PantryItem> = items
        .iter()
        .filter(|item| matches(item, query))
        .cloned()
        .collect();
    sort_items(&mut visible, sort_key);
    visible
}

/// Secondary line rendered under an item's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryLabel {
    Quantity(u32),
    Category(String),
    ExpiryDate(DateTime<Utc>),
    AddedDate(DateTime<Utc>),
    UserId(String),
}

impl fmt::Display for SecondaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondaryLabel::Quantity(q) => write!(f, "Quantity: {q}"),
            SecondaryLabel::Category(c) => write!(f, "Category: {}", capitalize(c)),
            SecondaryLabel::ExpiryDate(d) => write!(f, "Expiry Date: {}", format_timestamp(d)),
            SecondaryLabel::AddedDate(d) => write!(f, "Added Date: {}", format_timestamp(d)),
            SecondaryLabel::UserId(u) => write!(f, "User ID: {u}"),
        }
    }
}

/// Pick the secondary label for `item`.
///
/// With a query, show the field that matched (quantity for a name match).
/// Without one, show the field the list is sorted by.
pub fn secondary_label(item: &PantryItem, query: &str, sort_key: SortKey) -> SecondaryLabel {
    if query.is_empty() {
        return match sort_key {
            SortKey::None => SecondaryLabel::Quantity(item.quantity()),
            SortKey::Category => SecondaryLabel::Category(item.category().to_string()),
            SortKey::ExpiryDate => SecondaryLabel::ExpiryDate(item.expiry_date()),
            SortKey::AddedDate => SecondaryLabel::AddedDate(item.added_date()),
            SortKey::UserId => SecondaryLabel::UserId(item.user_id().to_string()),
        };
    }

    match match_field(item, query) {
        Some(MatchedField::Category) => SecondaryLabel::Category(item.category().to_string()),
        Some(MatchedField::UserId) => SecondaryLabel::UserId(item.user_id().to_string()),
        Some(MatchedField::Name) | None => SecondaryLabel::Quantity(item.quantity()),
    }
}

/// Upper-case the first character of every word.
pub fn capitalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        let word_char = c.is_alphanumeric() || c == '_';
        if word_char && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !word_char;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewPantryItem;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn item(id: &str, name: &str, category: &str, user_id: &str, quantity: u32) -> PantryItem {
        PantryItem::new(
            id.parse().unwrap(),
            NewPantryItem {
                name: name.to_string(),
                category: category.to_string(),
                quantity,
                expiry_date: day(2024, 1, 1),
                added_date: day(2023, 1, 1),
                user_id: user_id.to_string(),
            },
        )
    }

    fn with_dates(id: &str, expiry: DateTime<Utc>, added: DateTime<Utc>) -> PantryItem {
        PantryItem::new(
            id.parse().unwrap(),
            NewPantryItem {
                name: id.to_string(),
                category: "Misc".to_string(),
                quantity: 1,
                expiry_date: expiry,
                added_date: added,
                user_id: "u".to_string(),
            },
        )
    }

    /// Comparable rendering of the field `sort_key` orders by.
    fn sort_key_of(item: &PantryItem, sort_key: SortKey) -> String {
        match sort_key {
            SortKey::None => item.name().to_lowercase(),
            SortKey::Category => item.category().to_lowercase(),
            SortKey::UserId => item.user_id().to_lowercase(),
            SortKey::ExpiryDate => format_timestamp(&item.expiry_date()),
            SortKey::AddedDate => format_timestamp(&item.added_date()),
        }
    }

    fn names(items: &[PantryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn short_query_matches_name_but_not_long_category() {
        let items = vec![
            item("1", "Milk", "Dairy", "alice", 2),
            item("2", "Eggs", "Dairy", "alice", 12),
        ];

        let out = view(&items, "mi", SortKey::None);
        assert_eq!(names(&out), vec!["Milk"]);

        // "ai" is inside "Dairy" but 2 chars is less than half of 5.
        assert!(view(&items, "ai", SortKey::None).is_empty());
    }

    #[test]
    fn length_guard_accepts_exactly_half() {
        let items = vec![item("1", "Tofu", "Soya", "bob", 1)];
        // len("so") * 2 == len("Soya")
        assert_eq!(match_field(&items[0], "so"), Some(MatchedField::Category));
        assert_eq!(view(&items, "SO", SortKey::None).len(), 1);
        // One char over a four char field is below the ratio.
        assert_eq!(match_field(&items[0], "y"), None);
    }

    #[test]
    fn user_id_matches_when_long_enough() {
        let it = item("1", "Rice", "Grains", "carol", 1);
        assert_eq!(match_field(&it, "caro"), Some(MatchedField::UserId));
        assert_eq!(match_field(&it, "ca"), None);
    }

    #[test]
    fn name_match_takes_precedence() {
        let it = item("1", "Dairy Milk", "Dairy", "dairy", 3);
        assert_eq!(match_field(&it, "dairy"), Some(MatchedField::Name));
        assert_eq!(secondary_label(&it, "dairy", SortKey::Category).to_string(), "Quantity: 3");
    }

    #[test]
    fn empty_query_orders_by_expiry() {
        let items = vec![
            with_dates("a", day(2024, 1, 1), day(2023, 1, 1)),
            with_dates("b", day(2023, 6, 1), day(2023, 1, 2)),
        ];
        let out = view(&items, "", SortKey::ExpiryDate);
        assert_eq!(names(&out), vec!["b", "a"]);
    }

    #[test]
    fn none_orders_by_name_case_insensitively() {
        let items = vec![
            item("1", "milk", "Dairy", "u", 1),
            item("2", "Apples", "Fruit", "u", 1),
            item("3", "bread", "Bakery", "u", 1),
        ];
        let out = view(&items, "", SortKey::None);
        assert_eq!(names(&out), vec!["Apples", "bread", "milk"]);
    }

    #[test]
    fn labels_follow_sort_key_without_query() {
        let it = item("1", "Milk", "dairy products", "alice", 2);
        assert_eq!(secondary_label(&it, "", SortKey::None).to_string(), "Quantity: 2");
        assert_eq!(
            secondary_label(&it, "", SortKey::Category).to_string(),
            "Category: Dairy Products"
        );
        assert_eq!(
            secondary_label(&it, "", SortKey::ExpiryDate).to_string(),
            "Expiry Date: 2024-01-01T00:00:00.000Z"
        );
        assert_eq!(
            secondary_label(&it, "", SortKey::AddedDate).to_string(),
            "Added Date: 2023-01-01T00:00:00.000Z"
        );
        assert_eq!(secondary_label(&it, "", SortKey::UserId).to_string(), "User ID: alice");
    }

    #[test]
    fn labels_follow_matched_field_with_query() {
        let it = item("1", "Milk", "dairy", "alice", 2);
        assert_eq!(secondary_label(&it, "dair", SortKey::None).to_string(), "Category: Dairy");
        assert_eq!(secondary_label(&it, "alic", SortKey::None).to_string(), "User ID: alice");
        assert_eq!(secondary_label(&it, "zzz", SortKey::UserId).to_string(), "Quantity: 2");
    }

    #[test]
    fn sort_key_parses_common_spellings() {
        assert_eq!("expiryDate".parse::<SortKey>().unwrap(), SortKey::ExpiryDate);
        assert_eq!("expiry-date".parse::<SortKey>().unwrap(), SortKey::ExpiryDate);
        assert_eq!("added_date".parse::<SortKey>().unwrap(), SortKey::AddedDate);
        assert_eq!("USER-ID".parse::<SortKey>().unwrap(), SortKey::UserId);
        assert_eq!("none".parse::<SortKey>().unwrap(), SortKey::None);
        assert_eq!(
            "price".parse::<SortKey>(),
            Err(DomainError::UnknownSortKey("price".to_string()))
        );
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn capitalize_uppercases_each_word() {
        assert_eq!(capitalize("dairy products"), "Dairy Products");
        assert_eq!(capitalize("self-raising flour"), "Self-Raising Flour");
        assert_eq!(capitalize(""), "");
    }

    fn arb_item() -> impl Strategy<Value = PantryItem> {
        (
            "[a-z0-9]{6}",
            "[A-Za-z][A-Za-z ]{0,11}",
            "[A-Za-z]{1,10}",
            "[a-z0-9]{1,8}",
            0u32..20,
            0i64..2_000_000_000,
            0i64..2_000_000_000,
        )
            .prop_map(|(id, name, category, user_id, quantity, expiry, added)| {
                PantryItem::new(
                    id.parse().unwrap(),
                    NewPantryItem {
                        name,
                        category,
                        quantity,
                        expiry_date: Utc.timestamp_opt(expiry, 0).unwrap(),
                        added_date: Utc.timestamp_opt(added, 0).unwrap(),
                        user_id,
                    },
                )
            })
    }

    fn arb_sort_key() -> impl Strategy<Value = SortKey> {
        prop::sample::select(SortKey::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: an empty query keeps every item.
        #[test]
        fn empty_query_keeps_everything(
            items in prop::collection::vec(arb_item(), 0..30),
            key in arb_sort_key()
        ) {
            let out = view(&items, "", key);
            prop_assert_eq!(out.len(), items.len());
        }

        /// Property: membership is exactly the name match or the guarded
        /// category/user id match.
        #[test]
        fn membership_matches_predicate(
            items in prop::collection::vec(arb_item(), 0..30),
            query in "[a-zA-Z0-9]{1,4}"
        ) {
            let out = view(&items, &query, SortKey::None);
            let q = query.to_lowercase();
            for it in &items {
                let expected = it.name().to_lowercase().contains(&q)
                    || (2 * q.chars().count() >= it.category().chars().count()
                        && it.category().to_lowercase().contains(&q))
                    || (2 * q.chars().count() >= it.user_id().chars().count()
                        && it.user_id().to_lowercase().contains(&q));
                let present = out.iter().filter(|o| *o == it).count();
                let total = items.iter().filter(|o| *o == it).count();
                prop_assert_eq!(present, if expected { total } else { 0 });
            }
        }

        /// Property: output is non-decreasing on the sort field.
        #[test]
        fn output_is_sorted(
            items in prop::collection::vec(arb_item(), 0..30),
            key in arb_sort_key()
        ) {
            let out = view(&items, "", key);
            for pair in out.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                match key {
                    SortKey::None => prop_assert!(a.name().to_lowercase() <= b.name().to_lowercase()),
                    SortKey::Category => prop_assert!(a.category().to_lowercase() <= b.category().to_lowercase()),
                    SortKey::UserId => prop_assert!(a.user_id().to_lowercase() <= b.user_id().to_lowercase()),
                    SortKey::ExpiryDate => prop_assert!(a.expiry_date() <= b.expiry_date()),
                    SortKey::AddedDate => prop_assert!(a.added_date() <= b.added_date()),
                }
            }
        }

        /// Property: items with equal sort keys keep their input order, for every key.
        #[test]
        fn sort_is_stable(
            keys in prop::collection::vec(0usize..3, 0..20),
            sort_key in prop::sample::select(SortKey::ALL.to_vec()),
        ) {
            // Few distinct values per field, so every key produces ties.
            let items: Vec<PantryItem> = keys
                .iter()
                .enumerate()
                .map(|(n, k)| {
                    PantryItem::new(
                        format!("id{n}").parse().unwrap(),
                        NewPantryItem {
                            name: ["Milk", "milk", "Eggs"][*k].to_string(),
                            category: ["Dairy", "DAIRY", "Fruit"][*k].to_string(),
                            quantity: 1,
                            expiry_date: day(2024, 1, 1 + *k as u32),
                            added_date: day(2023, 1, 1 + *k as u32),
                            user_id: ["alice", "Alice", "bob"][*k].to_string(),
                        },
                    )
                })
                .collect();

            let out = view(&items, "", sort_key);
            prop_assert_eq!(out.len(), items.len());
            for pair in out.windows(2) {
                if sort_key_of(&pair[0], sort_key) == sort_key_of(&pair[1], sort_key) {
                    let pos = |it: &PantryItem| items.iter().position(|o| o.id() == it.id());
                    prop_assert!(pos(&pair[0]) < pos(&pair[1]));
                }
            }
        }
    }
}
