// ============================================================================
// Aggregate Pattern - Command -> Events -> State
// ============================================================================
//
// Key Principles:
// 1. Commands are validated before emitting events
// 2. Events represent facts that have already been accepted
// 3. All state changes flow through `apply_event`
//
// ============================================================================

/// Generic aggregate trait
///
/// Type Parameters:
/// - `Event`: facts emitted by the aggregate
/// - `Command`: user intent handled by the aggregate
/// - `Error`: business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event;
    type Command;
    type Error;

    /// Apply an accepted event to update state
    fn apply_event(&mut self, event: &Self::Event);

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Number of events applied so far
    fn version(&self) -> u64;

    /// Handle a command and apply whatever it emits
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event);
        }
        Ok(events)
    }

    /// Rebuild state by replaying events onto an initial value
    fn replay<'a, I>(mut initial: Self, events: I) -> Self
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
    {
        for event in events {
            initial.apply_event(event);
        }
        initial
    }
}
