/// One record moving from the source table to the destination table.
///
/// Only the three transferable columns are carried; the destination's
/// `date` column is filled in on the destination side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRow {
    /// Value of the `tk` column, kept as text whatever its SQL type.
    pub key: String,
    pub name: String,
    pub department: String,
}

impl SyncRow {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            department: department.into(),
        }
    }
}
