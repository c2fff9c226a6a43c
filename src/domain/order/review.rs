use std::fmt;

use serde::Serialize;

use super::value_objects::{OrderDraft, OrderKind, ShippingMethod};

// ============================================================================
// Review Projection
// ============================================================================
//
// Read-only summary shown on the final confirmation step. Pure: borrows the
// draft, never validates or mutates it.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub what: ReviewSection,
    pub personal: ReviewSection,
    pub address: ReviewSection,
    pub items: Option<ReviewSection>,
    pub collection: ReviewSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub title: &'static str,
    pub lines: Vec<String>,
}

impl ReviewSection {
    fn new(title: &'static str, lines: Vec<String>) -> Self {
        Self { title, lines }
    }
}

impl ReviewSummary {
    /// Sections in display order
    pub fn sections(&self) -> Vec<&ReviewSection> {
        let mut sections = vec![&self.what, &self.personal, &self.address];
        if let Some(items) = &self.items {
            sections.push(items);
        }
        sections.push(&self.collection);
        sections
    }
}

pub fn project(draft: &OrderDraft) -> ReviewSummary {
    let what = match draft.kind {
        OrderKind::Photos => ReviewSection::new(
            "What you're framing",
            vec![
                draft.kind.label().to_string(),
                "Digital upload after placing the order".to_string(),
            ],
        ),
        OrderKind::Garlands => ReviewSection::new(
            "What you're framing",
            vec![
                draft.kind.label().to_string(),
                "We'll guide you step-by-step".to_string(),
            ],
        ),
    };

    let p = &draft.personal;
    let personal = ReviewSection::new(
        "Personal",
        vec![
            format!("{} {}", p.first_name.trim(), p.last_name.trim()),
            format!("{} • {}", p.email.trim(), p.phone.trim()),
        ],
    );

    let a = &draft.address;
    let address = ReviewSection::new(
        "Address",
        vec![
            a.street.trim().to_string(),
            format!("{}, {} {}", a.city.trim(), a.state.trim(), a.postal_code.trim()),
        ],
    );

    let items = match draft.kind {
        OrderKind::Photos => None,
        OrderKind::Garlands => {
            let i = &draft.items;
            let mut qty = format!("Qty: {}", i.quantity.trim());
            if let Some(notes) = i.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                qty.push_str(" • ");
                qty.push_str(notes);
            }
            Some(ReviewSection::new(
                "Items",
                vec![i.description.trim().to_string(), qty],
            ))
        }
    };

    let s = &draft.shipping;
    let collection_lines = match (draft.kind, s.method) {
        (OrderKind::Garlands, ShippingMethod::Pickup) => {
            let date = s.pickup_date.map(|d| d.to_string()).unwrap_or_default();
            let slot = s.pickup_slot.map(|slot| slot.label()).unwrap_or_default();
            vec!["Pickup".to_string(), format!("{} • {}", date, slot)]
        }
        (OrderKind::Garlands, _) => vec![
            "Courier".to_string(),
            "Ship with any tracked courier".to_string(),
        ],
        (OrderKind::Photos, _) => vec!["Digital upload".to_string()],
    };
    let collection = ReviewSection::new("Collection method", collection_lines);

    ReviewSummary {
        what,
        personal,
        address,
        items,
        collection,
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", section.title)?;
            for line in &section.lines {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}
