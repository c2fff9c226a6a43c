use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::value_objects::{OrderDraft, OrderKind, PhotoFile, ShippingMethod};

// ============================================================================
// Draft Validation
// ============================================================================
//
// Validation is pull-based: the wizard asks for the sections relevant to the
// current step and gets back a map of field path -> messages. The UI renders
// the first message of each field.
//
// ============================================================================

/// Largest accepted photo, exclusive
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;

pub mod fields {
    pub const KIND: &str = "kind";
    pub const FIRST_NAME: &str = "personal.firstName";
    pub const LAST_NAME: &str = "personal.lastName";
    pub const EMAIL: &str = "personal.email";
    pub const PHONE: &str = "personal.phone";
    pub const STREET: &str = "address.street";
    pub const CITY: &str = "address.city";
    pub const STATE: &str = "address.state";
    pub const POSTAL_CODE: &str = "address.postalCode";
    pub const DESCRIPTION: &str = "items.description";
    pub const QUANTITY: &str = "items.quantity";
    pub const PHOTO_FILE: &str = "photo.file";
    pub const SHIPPING_METHOD: &str = "shipping.method";
    pub const PICKUP_DATE: &str = "shipping.pickupDate";
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Field groups of the draft, validated together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Kind,
    Personal,
    Address,
    Items,
    Photo,
    Shipping,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Kind => "kind",
            Section::Personal => "personal",
            Section::Address => "address",
            Section::Items => "items",
            Section::Photo => "photo",
            Section::Shipping => "shipping",
        }
    }

    /// Every section that matters for a draft of `kind`.
    /// Items only apply to garlands, the photo only to photos.
    pub fn all_for(kind: OrderKind) -> &'static [Section] {
        match kind {
            OrderKind::Photos => &[
                Section::Kind,
                Section::Personal,
                Section::Address,
                Section::Photo,
                Section::Shipping,
            ],
            OrderKind::Garlands => &[
                Section::Kind,
                Section::Personal,
                Section::Address,
                Section::Items,
                Section::Shipping,
            ],
        }
    }

    fn owns(self, path: &str) -> bool {
        path == self.as_str() || path.starts_with(&format!("{}.", self.as_str()))
    }
}

/// Field path -> human readable messages, ordered by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, message: impl Into<String>) {
        self.fields.entry(path.to_string()).or_default().push(message.into());
    }

    /// The message the UI shows beneath the field
    pub fn first(&self, path: &str) -> Option<&str> {
        self.fields.get(path).and_then(|msgs| msgs.first()).map(String::as_str)
    }

    pub fn messages(&self, path: &str) -> &[String] {
        self.fields.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Sections with at least one failing field
    pub fn sections(&self) -> Vec<Section> {
        let all = [
            Section::Kind,
            Section::Personal,
            Section::Address,
            Section::Items,
            Section::Photo,
            Section::Shipping,
        ];
        all.into_iter()
            .filter(|section| self.fields.keys().any(|path| section.owns(path)))
            .collect()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (path, messages) in other.fields {
            self.fields.entry(path).or_default().extend(messages);
        }
    }

    /// Drop every error that belongs to one of `sections`
    pub fn clear_sections(&mut self, sections: &[Section]) {
        self.fields
            .retain(|path, _| !sections.iter().any(|section| section.owns(path)));
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.fields {
            if let Some(message) = messages.first() {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", path, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate the given sections of the draft
pub fn validate_sections(draft: &OrderDraft, sections: &[Section]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for section in sections {
        match section {
            // The kind is a closed enum, there is nothing to reject
            Section::Kind => {}
            Section::Personal => validate_personal(draft, &mut errors),
            Section::Address => validate_address(draft, &mut errors),
            Section::Items => validate_items(draft, &mut errors),
            Section::Photo => validate_photo_attachment(draft, &mut errors),
            Section::Shipping => {
                validate_shipping(draft, &mut errors);
                check_pickup_schedule(draft, &mut errors);
            }
        }
    }
    errors.into_result()
}

/// Validate everything that matters for the draft's kind
pub fn validate_draft(draft: &OrderDraft) -> Result<(), ValidationErrors> {
    validate_sections(draft, Section::all_for(draft.kind))
}

fn min_chars(value: &str, min: usize) -> bool {
    value.trim().chars().count() >= min
}

fn validate_personal(draft: &OrderDraft, errors: &mut ValidationErrors) {
    let p = &draft.personal;
    if !min_chars(&p.first_name, 1) {
        errors.add(fields::FIRST_NAME, "First name is required");
    }
    if !min_chars(&p.last_name, 1) {
        errors.add(fields::LAST_NAME, "Last name is required");
    }
    if !is_valid_email(&p.email) {
        errors.add(fields::EMAIL, "Enter a valid email");
    }
    if !min_chars(&p.phone, 7) {
        errors.add(fields::PHONE, "Enter a valid phone");
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}

fn validate_address(draft: &OrderDraft, errors: &mut ValidationErrors) {
    let a = &draft.address;
    if !min_chars(&a.street, 3) {
        errors.add(fields::STREET, "Street is required");
    }
    if !min_chars(&a.city, 2) {
        errors.add(fields::CITY, "City is required");
    }
    if !min_chars(&a.state, 2) {
        errors.add(fields::STATE, "State is required");
    }
    if !min_chars(&a.postal_code, 4) {
        errors.add(fields::POSTAL_CODE, "Postal code is required");
    }
}

fn validate_items(draft: &OrderDraft, errors: &mut ValidationErrors) {
    let items = &draft.items;
    if !min_chars(&items.description, 3) {
        errors.add(fields::DESCRIPTION, "Please describe what you're sending");
    }
    match items.parsed_quantity() {
        None => errors.add(fields::QUANTITY, "Quantity must be a whole number"),
        Some(n) if n < 1 => errors.add(fields::QUANTITY, "Min 1 item"),
        Some(_) => {}
    }
}

fn validate_photo_attachment(draft: &OrderDraft, errors: &mut ValidationErrors) {
    match &draft.photo.file {
        None => errors.add(fields::PHOTO_FILE, "Image required"),
        Some(file) => {
            for message in photo_file_problems(file) {
                errors.add(fields::PHOTO_FILE, message);
            }
        }
    }
}

/// The three independent photo predicates. Every failing one is reported.
pub fn photo_file_problems(file: &PhotoFile) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if file.name.is_empty() {
        problems.push("Image required");
    }
    if !file.is_image() {
        problems.push("File must be an image");
    }
    if file.size_bytes >= MAX_PHOTO_BYTES {
        problems.push("File must be smaller than 5MB");
    }
    problems
}

fn validate_shipping(draft: &OrderDraft, errors: &mut ValidationErrors) {
    let method = draft.shipping.method;
    if !draft.kind.allows(method) {
        let message = match draft.kind {
            OrderKind::Photos => "Photos are collected by digital upload",
            OrderKind::Garlands => "Choose pickup or courier",
        };
        errors.add(fields::SHIPPING_METHOD, message);
    }
}

/// Garlands collected by pickup need both a date and a slot.
/// Reported against the pickup date field.
pub fn check_pickup_schedule(draft: &OrderDraft, errors: &mut ValidationErrors) {
    let shipping = &draft.shipping;
    if draft.kind == OrderKind::Garlands
        && shipping.method == ShippingMethod::Pickup
        && (shipping.pickup_date.is_none() || shipping.pickup_slot.is_none())
    {
        errors.add(fields::PICKUP_DATE, "Select a pickup date and time slot");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
