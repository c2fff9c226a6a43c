use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregate::Aggregate;
use super::collection::{detect_collection_method, is_offered_pickup_date, pickup_dates};
use super::commands::WizardCommand;
use super::eligibility::PickupArea;
use super::errors::WizardError;
use super::events::WizardEvent;
use super::validation::{fields, photo_file_problems, validate_sections, Section, ValidationErrors};
use super::value_objects::{OrderConfirmation, OrderDraft, OrderKind, ShippingMethod};

// ============================================================================
// Wizard Steps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Kind,
    Details,
    Collection,
    Review,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Kind, Step::Details, Step::Collection, Step::Review];

    pub fn index(self) -> usize {
        match self {
            Step::Kind => 0,
            Step::Details => 1,
            Step::Collection => 2,
            Step::Review => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self, kind: OrderKind) -> &'static str {
        match (self, kind) {
            (Step::Kind, _) => "What are you framing?",
            (Step::Details, _) => "Your details & address",
            (Step::Collection, OrderKind::Garlands) => "Pickup or courier",
            (Step::Collection, OrderKind::Photos) => "Collection",
            (Step::Review, _) => "Review & submit",
        }
    }

    /// Sections that gate leaving this step
    pub fn sections(self, kind: OrderKind) -> &'static [Section] {
        match (self, kind) {
            (Step::Kind, _) => &[Section::Kind],
            (Step::Details, OrderKind::Photos) => &[Section::Personal, Section::Address, Section::Photo],
            (Step::Details, OrderKind::Garlands) => &[Section::Personal, Section::Address, Section::Items],
            (Step::Collection, _) => &[Section::Shipping],
            (Step::Review, kind) => Section::all_for(kind),
        }
    }

    /// Forward target. Photos have no collection step.
    pub fn next(self, kind: OrderKind) -> Option<Step> {
        match (self, kind) {
            (Step::Kind, _) => Some(Step::Details),
            (Step::Details, OrderKind::Photos) => Some(Step::Review),
            (Step::Details, OrderKind::Garlands) => Some(Step::Collection),
            (Step::Collection, _) => Some(Step::Review),
            (Step::Review, _) => None,
        }
    }

    /// Backward target, mirroring the photos skip and floored at the first step
    pub fn prev(self, kind: OrderKind) -> Step {
        match (self, kind) {
            (Step::Review, OrderKind::Photos) => Step::Details,
            (Step::Review, OrderKind::Garlands) => Step::Collection,
            (Step::Collection, _) => Step::Details,
            (Step::Details, _) | (Step::Kind, _) => Step::Kind,
        }
    }
}

// ============================================================================
// Order Wizard Aggregate - Draft + step state machine
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrderWizard {
    // Identity
    pub session_id: Uuid,
    pub version: u64,

    pub draft: OrderDraft,
    pub step: Step,
    pub submitting: bool,
    pub result: Option<OrderConfirmation>,
    /// Last submission failure, cleared by the next attempt
    pub failure: Option<String>,
    /// Field errors currently shown to the user
    pub errors: ValidationErrors,

    today: NaiveDate,
    pickup_area: PickupArea,
}

impl OrderWizard {
    pub fn new(kind: OrderKind) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            version: 0,
            draft: OrderDraft::new(kind),
            step: Step::Kind,
            submitting: false,
            result: None,
            failure: None,
            errors: ValidationErrors::new(),
            today: Utc::now().date_naive(),
            pickup_area: PickupArea::default(),
        }
    }

    /// Start a wizard seeded from the `?kind=` query parameter
    pub fn from_query(kind_param: Option<&str>) -> Self {
        Self::new(OrderKind::from_query(kind_param))
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_pickup_area(mut self, area: PickupArea) -> Self {
        self.pickup_area = area;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn title(&self) -> &'static str {
        self.step.title(self.draft.kind)
    }

    /// Success is sticky: nothing changes once an order id exists
    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Eligibility hint for the collection step
    pub fn pickup_eligible(&self) -> bool {
        self.pickup_area
            .covers(&self.draft.address.city, &self.draft.address.postal_code)
    }

    pub fn pickup_dates(&self) -> Vec<NaiveDate> {
        pickup_dates(self.today)
    }

    /// Checks run before handing the draft to the order service
    pub fn begin_submission(&self) -> Result<Vec<WizardEvent>, WizardError> {
        if self.is_complete() {
            return Err(WizardError::Completed);
        }
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        if self.step != Step::Review {
            return Err(WizardError::NotOnReviewStep(self.step));
        }
        self.validate(Section::all_for(self.draft.kind))
            .map_err(WizardError::Validation)?;

        Ok(vec![WizardEvent::SubmissionStarted])
    }

    /// Draft rules for `sections`, plus the pickup area when shipping is checked.
    /// The address can change after pickup was chosen.
    pub fn validate(&self, sections: &[Section]) -> Result<(), ValidationErrors> {
        let mut errors = match validate_sections(&self.draft, sections) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if sections.contains(&Section::Shipping)
            && self.draft.shipping.method == ShippingMethod::Pickup
            && !self.pickup_eligible()
        {
            errors.add(fields::SHIPPING_METHOD, "Pickup is not available for this address");
        }
        errors.into_result()
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.is_complete() {
            return Err(WizardError::Completed);
        }
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        Ok(())
    }

    fn advance(&self) -> Result<Vec<WizardEvent>, WizardError> {
        let kind = self.draft.kind;
        let to = self.step.next(kind).ok_or(WizardError::NoNextStep(self.step))?;

        self.validate(self.step.sections(kind)).map_err(WizardError::Validation)?;

        Ok(vec![WizardEvent::StepChanged { from: self.step, to }])
    }

    fn choose_method(&self, method: ShippingMethod) -> Result<Vec<WizardEvent>, WizardError> {
        let kind = self.draft.kind;
        if !kind.allows(method) {
            return Err(WizardError::MethodNotAllowed { kind, method });
        }
        if method == ShippingMethod::Pickup && !self.pickup_eligible() {
            return Err(WizardError::PickupUnavailable);
        }
        Ok(vec![WizardEvent::CollectionMethodChosen(method)])
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderWizard {
    type Event = WizardEvent;
    type Command = WizardCommand;
    type Error = WizardError;

    fn apply_event(&mut self, event: &Self::Event) {
        match event {
            WizardEvent::KindSelected { kind, shipping_method } => {
                self.draft.set_kind(*kind);
                self.draft.shipping.method = *shipping_method;
            }
            WizardEvent::PersonalUpdated(personal) => {
                self.draft.personal = personal.clone();
            }
            WizardEvent::AddressUpdated(address) => {
                self.draft.address = address.clone();
            }
            WizardEvent::ItemsUpdated(items) => {
                self.draft.items = items.clone();
            }
            WizardEvent::PhotoAttached(file) => {
                self.draft.photo.file = Some(file.clone());
            }
            WizardEvent::PhotoRemoved => {
                self.draft.photo.file = None;
            }
            WizardEvent::CollectionMethodChosen(method) => {
                self.draft.shipping.method = *method;
            }
            WizardEvent::PickupDateSelected(date) => {
                self.draft.shipping.pickup_date = Some(*date);
            }
            WizardEvent::PickupSlotSelected(slot) => {
                self.draft.shipping.pickup_slot = Some(*slot);
            }
            WizardEvent::StepChanged { to, .. } => {
                self.step = *to;
            }
            WizardEvent::SubmissionStarted => {
                self.submitting = true;
                self.failure = None;
            }
            WizardEvent::SubmissionSucceeded(confirmation) => {
                self.submitting = false;
                self.result = Some(confirmation.clone());
            }
            WizardEvent::SubmissionFailed { reason } => {
                self.submitting = false;
                self.failure = Some(reason.clone());
            }
        }

        self.version += 1;
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_editable()?;

        match command {
            WizardCommand::SelectKind(kind) => {
                if *kind == self.draft.kind {
                    return Ok(vec![]);
                }
                Ok(vec![WizardEvent::KindSelected {
                    kind: *kind,
                    shipping_method: kind.default_shipping_method(),
                }])
            }

            WizardCommand::UpdatePersonal(personal) => {
                Ok(vec![WizardEvent::PersonalUpdated(personal.clone())])
            }

            WizardCommand::UpdateAddress(address) => {
                Ok(vec![WizardEvent::AddressUpdated(address.clone())])
            }

            WizardCommand::UpdateItems(items) => {
                Ok(vec![WizardEvent::ItemsUpdated(items.clone())])
            }

            WizardCommand::AttachPhoto(file) => {
                let problems = photo_file_problems(file);
                if !problems.is_empty() {
                    return Err(WizardError::FileRejected(problems.join("; ")));
                }
                Ok(vec![WizardEvent::PhotoAttached(file.clone())])
            }

            WizardCommand::RemovePhoto => {
                if self.draft.photo.file.is_none() {
                    return Ok(vec![]);
                }
                Ok(vec![WizardEvent::PhotoRemoved])
            }

            WizardCommand::ChooseCollectionMethod(method) => self.choose_method(*method),

            WizardCommand::DetectCollectionMethod => {
                let detected = detect_collection_method(self.draft.kind, &self.draft.address, &self.pickup_area);
                match detected {
                    Some(method) if method != self.draft.shipping.method => {
                        Ok(vec![WizardEvent::CollectionMethodChosen(method)])
                    }
                    _ => Ok(vec![]),
                }
            }

            WizardCommand::SetPickupDate(date) => {
                if !is_offered_pickup_date(self.today, *date) {
                    return Err(WizardError::PickupDateUnavailable(*date));
                }
                Ok(vec![WizardEvent::PickupDateSelected(*date)])
            }

            WizardCommand::SetPickupSlot(slot) => Ok(vec![WizardEvent::PickupSlotSelected(*slot)]),

            WizardCommand::Next => self.advance(),

            WizardCommand::Back => {
                let to = self.step.prev(self.draft.kind);
                if to == self.step {
                    return Ok(vec![]);
                }
                Ok(vec![WizardEvent::StepChanged { from: self.step, to }])
            }
        }
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::{Address, ItemDetails, PersonalInfo, PhotoFile, PickupSlot};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn wizard(kind: OrderKind) -> OrderWizard {
        OrderWizard::new(kind).with_today(today())
    }

    fn fill_details(w: &mut OrderWizard) {
        w.execute(&WizardCommand::UpdatePersonal(PersonalInfo {
            first_name: "Sarah".to_string(),
            last_name: "Lee".to_string(),
            email: "sarah@example.com".to_string(),
            phone: "5551234567".to_string(),
        }))
        .unwrap();
        w.execute(&WizardCommand::UpdateAddress(Address {
            street: "123 7th Ave".to_string(),
            city: "New York".to_string(),
            state: "NY".to_string(),
            postal_code: "10001".to_string(),
        }))
        .unwrap();
    }

    #[test]
    fn test_step_navigation_table() {
        assert_eq!(Step::Details.next(OrderKind::Photos), Some(Step::Review));
        assert_eq!(Step::Details.next(OrderKind::Garlands), Some(Step::Collection));
        assert_eq!(Step::Review.next(OrderKind::Garlands), None);
        assert_eq!(Step::Review.prev(OrderKind::Photos), Step::Details);
        assert_eq!(Step::Review.prev(OrderKind::Garlands), Step::Collection);
        assert_eq!(Step::Kind.prev(OrderKind::Garlands), Step::Kind);
        assert_eq!(Step::from_index(2), Some(Step::Collection));
        assert_eq!(Step::from_index(4), None);
    }

    #[test]
    fn test_step_titles() {
        assert_eq!(Step::Collection.title(OrderKind::Garlands), "Pickup or courier");
        assert_eq!(Step::Collection.title(OrderKind::Photos), "Collection");
        assert_eq!(Step::Review.title(OrderKind::Photos), "Review & submit");
    }

    #[test]
    fn test_photos_skip_collection_step() {
        let mut w = wizard(OrderKind::Photos);
        w.execute(&WizardCommand::Next).unwrap();
        assert_eq!(w.step, Step::Details);

        fill_details(&mut w);
        w.execute(&WizardCommand::AttachPhoto(PhotoFile::new("a.jpg", "image/jpeg", 1024)))
            .unwrap();

        let events = w.execute(&WizardCommand::Next).unwrap();
        assert_eq!(
            events,
            vec![WizardEvent::StepChanged {
                from: Step::Details,
                to: Step::Review
            }]
        );
        assert_eq!(w.step, Step::Review);

        w.execute(&WizardCommand::Back).unwrap();
        assert_eq!(w.step, Step::Details);
    }

    #[test]
    fn test_garlands_visit_collection_step() {
        let mut w = wizard(OrderKind::Garlands);
        w.execute(&WizardCommand::Next).unwrap();
        fill_details(&mut w);
        w.execute(&WizardCommand::UpdateItems(ItemDetails {
            description: "Bridal bouquet".to_string(),
            quantity: "1".to_string(),
            notes: None,
        }))
        .unwrap();

        w.execute(&WizardCommand::Next).unwrap();
        assert_eq!(w.step, Step::Collection);
        w.execute(&WizardCommand::Next).unwrap();
        assert_eq!(w.step, Step::Review);

        w.execute(&WizardCommand::Back).unwrap();
        assert_eq!(w.step, Step::Collection);
    }

    #[test]
    fn test_failed_validation_keeps_step() {
        let mut w = wizard(OrderKind::Garlands);
        w.execute(&WizardCommand::Next).unwrap();

        let err = w.execute(&WizardCommand::Next).unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.contains(fields::DESCRIPTION));
        assert!(!errors.contains(fields::PHOTO_FILE));
        assert_eq!(w.step, Step::Details);
    }

    #[test]
    fn test_back_from_first_step_is_noop() {
        let mut w = wizard(OrderKind::Photos);
        let events = w.execute(&WizardCommand::Back).unwrap();
        assert!(events.is_empty());
        assert_eq!(w.step, Step::Kind);
    }

    #[test]
    fn test_no_next_from_review() {
        let mut w = wizard(OrderKind::Photos);
        w.step = Step::Review;
        assert!(matches!(
            w.execute(&WizardCommand::Next),
            Err(WizardError::NoNextStep(Step::Review))
        ));
    }

    #[test]
    fn test_pickup_requires_eligible_address() {
        let mut w = wizard(OrderKind::Garlands);
        w.execute(&WizardCommand::UpdateAddress(Address {
            street: "1 Main St".to_string(),
            city: "Albany".to_string(),
            state: "NY".to_string(),
            postal_code: "12207".to_string(),
        }))
        .unwrap();

        assert!(matches!(
            w.execute(&WizardCommand::ChooseCollectionMethod(ShippingMethod::Pickup)),
            Err(WizardError::PickupUnavailable)
        ));
        assert!(matches!(
            w.execute(&WizardCommand::ChooseCollectionMethod(ShippingMethod::Digital)),
            Err(WizardError::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn test_pickup_rechecked_after_address_change() {
        let mut w = wizard(OrderKind::Garlands);
        w.execute(&WizardCommand::Next).unwrap();
        fill_details(&mut w);
        w.execute(&WizardCommand::UpdateItems(ItemDetails {
            description: "Bridal bouquet".to_string(),
            quantity: "1".to_string(),
            notes: None,
        }))
        .unwrap();
        w.execute(&WizardCommand::Next).unwrap();

        w.execute(&WizardCommand::ChooseCollectionMethod(ShippingMethod::Pickup)).unwrap();
        let date = w.pickup_dates()[0];
        w.execute(&WizardCommand::SetPickupDate(date)).unwrap();
        w.execute(&WizardCommand::SetPickupSlot(PickupSlot::TenToNoon)).unwrap();
        w.execute(&WizardCommand::Next).unwrap();
        assert_eq!(w.step, Step::Review);
        assert!(w.begin_submission().is_ok());

        w.execute(&WizardCommand::UpdateAddress(Address {
            street: "1 Main St".to_string(),
            city: "Albany".to_string(),
            state: "NY".to_string(),
            postal_code: "12207".to_string(),
        }))
        .unwrap();

        let err = w.begin_submission().unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().first(fields::SHIPPING_METHOD),
            Some("Pickup is not available for this address")
        );

        w.execute(&WizardCommand::Back).unwrap();
        assert_eq!(w.step, Step::Collection);
        let err = w.execute(&WizardCommand::Next).unwrap_err();
        assert!(err.field_errors().unwrap().contains(fields::SHIPPING_METHOD));
        assert_eq!(w.step, Step::Collection);

        w.execute(&WizardCommand::ChooseCollectionMethod(ShippingMethod::Courier)).unwrap();
        w.execute(&WizardCommand::Next).unwrap();
        assert!(w.begin_submission().is_ok());
    }

    #[test]
    fn test_detect_collection_method() {
        let mut w = wizard(OrderKind::Garlands);
        fill_details(&mut w);

        w.execute(&WizardCommand::DetectCollectionMethod).unwrap();
        assert_eq!(w.draft.shipping.method, ShippingMethod::Pickup);

        // Already pickup: nothing to emit
        let events = w.execute(&WizardCommand::DetectCollectionMethod).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_pickup_date_window() {
        let mut w = wizard(OrderKind::Garlands);
        assert!(matches!(
            w.execute(&WizardCommand::SetPickupDate(today())),
            Err(WizardError::PickupDateUnavailable(_))
        ));
        let tomorrow = w.pickup_dates()[0];
        w.execute(&WizardCommand::SetPickupDate(tomorrow)).unwrap();
        w.execute(&WizardCommand::SetPickupSlot(PickupSlot::FourToSix)).unwrap();
        assert_eq!(w.draft.shipping.pickup_date, Some(tomorrow));
        assert_eq!(w.draft.shipping.pickup_slot, Some(PickupSlot::FourToSix));
    }

    #[test]
    fn test_rejected_photo_is_not_stored() {
        let mut w = wizard(OrderKind::Photos);
        let err = w
            .execute(&WizardCommand::AttachPhoto(PhotoFile::new("notes.pdf", "application/pdf", 10)))
            .unwrap_err();
        assert!(matches!(err, WizardError::FileRejected(_)));
        assert!(w.draft.photo.file.is_none());
    }

    #[test]
    fn test_begin_submission_requires_review_step() {
        let w = wizard(OrderKind::Photos);
        assert!(matches!(
            w.begin_submission(),
            Err(WizardError::NotOnReviewStep(Step::Kind))
        ));
    }

    #[test]
    fn test_completed_wizard_rejects_commands() {
        let mut w = wizard(OrderKind::Photos);
        w.apply_event(&WizardEvent::SubmissionSucceeded(OrderConfirmation {
            order_id: "MF-ABCDEFGH".to_string(),
            next_steps: "done".to_string(),
        }));

        assert!(matches!(
            w.execute(&WizardCommand::SelectKind(OrderKind::Garlands)),
            Err(WizardError::Completed)
        ));
        assert!(matches!(w.begin_submission(), Err(WizardError::Completed)));
    }

    #[test]
    fn test_replay_rebuilds_state() {
        let mut w = wizard(OrderKind::Photos);
        let mut history = Vec::new();
        history.extend(w.execute(&WizardCommand::SelectKind(OrderKind::Garlands)).unwrap());
        history.extend(w.execute(&WizardCommand::Next).unwrap());

        let rebuilt = OrderWizard::replay(wizard(OrderKind::Photos), &history);
        assert_eq!(rebuilt.draft, w.draft);
        assert_eq!(rebuilt.step, Step::Details);
        assert_eq!(rebuilt.version(), 2);
    }

    proptest! {
        #[test]
        fn prop_kind_toggle_never_leaves_stale_pickup(toggles in proptest::collection::vec(any::<bool>(), 1..12)) {
            let mut w = wizard(OrderKind::Garlands);
            fill_details(&mut w);
            w.execute(&WizardCommand::ChooseCollectionMethod(ShippingMethod::Pickup)).unwrap();

            for to_photos in toggles {
                let kind = if to_photos { OrderKind::Photos } else { OrderKind::Garlands };
                w.execute(&WizardCommand::SelectKind(kind)).unwrap();
            }
            w.execute(&WizardCommand::SelectKind(OrderKind::Photos)).unwrap();
            w.execute(&WizardCommand::SelectKind(OrderKind::Garlands)).unwrap();

            prop_assert_eq!(w.draft.shipping.method, ShippingMethod::Courier);
        }
    }
}
