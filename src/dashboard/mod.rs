pub mod aggregate;
pub mod fields;
pub mod present;

/// The active filter dimension: one institution, or every institution in a
/// sector. The UI's "Todas" sector sentinel maps onto the variant choice, so
/// the aggregation never sees a magic string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Institution(String),
    Sector(String),
}

impl Scope {
    pub fn is_sector(&self) -> bool {
        matches!(self, Scope::Sector(_))
    }
}
