/// Organisational labels carried through to every output row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerLabels {
    pub bonbu: Option<String>,
    pub center: Option<String>,
    pub team: Option<String>,
    pub guksa: Option<String>,
}

/// One entry of the customer directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub customer_number: String,
    pub labels: CustomerLabels,
}

impl CustomerRecord {
    pub fn new(customer_number: impl Into<String>, labels: CustomerLabels) -> Self {
        Self {
            customer_number: customer_number.into(),
            labels,
        }
    }
}
