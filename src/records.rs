use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::PVError;

// Sample data bundled into the binary; used when no file is given.
static SAMPLE_RECORDS: &str = include_str!("../data/sample_properties.json");

/// One allottee record. The source never changes after loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyRecord {
    pub id: u64,
    pub scheme_name: String,
    pub unique_id: String,
    pub owner_name: String,
    pub father_name: String,
    pub category: String,
    pub plot_number: String,
    pub registration_amount: u64,
    pub registration_date: String,
    pub permanent_address: String,
    pub current_address: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub allotment_amount: Option<u64>,
    #[serde(default)]
    pub allotment_date: Option<String>,
    #[serde(default)]
    pub sale_price: Option<u64>,
    #[serde(default)]
    pub lease_rent: Option<u64>,
    #[serde(default)]
    pub service_charges: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    SchemeName,
    UniqueId,
    OwnerName,
    FatherName,
    Category,
    PlotNumber,
    RegistrationAmount,
    RegistrationDate,
    PermanentAddress,
    CurrentAddress,
    Mobile,
    AllotmentAmount,
    AllotmentDate,
    SalePrice,
    LeaseRent,
    ServiceCharges,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Id,
        Field::SchemeName,
        Field::UniqueId,
        Field::OwnerName,
        Field::FatherName,
        Field::Category,
        Field::PlotNumber,
        Field::RegistrationAmount,
        Field::RegistrationDate,
        Field::PermanentAddress,
        Field::CurrentAddress,
        Field::Mobile,
        Field::AllotmentAmount,
        Field::AllotmentDate,
        Field::SalePrice,
        Field::LeaseRent,
        Field::ServiceCharges,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Id => "Serial No.",
            Field::SchemeName => "Scheme Name",
            Field::UniqueId => "Property Unique ID",
            Field::OwnerName => "Owner Name",
            Field::FatherName => "Father/Spouse Name",
            Field::Category => "Category",
            Field::PlotNumber => "Plot Number",
            Field::RegistrationAmount => "Registration Amount",
            Field::RegistrationDate => "Registration Date",
            Field::PermanentAddress => "Permanent Address",
            Field::CurrentAddress => "Current Address",
            Field::Mobile => "Mobile Number",
            Field::AllotmentAmount => "Allotment Amount",
            Field::AllotmentDate => "Allotment Date",
            Field::SalePrice => "Sale Price",
            Field::LeaseRent => "Lease Rent",
            Field::ServiceCharges => "Service Charges",
        }
    }

    pub fn is_money(&self) -> bool {
        matches!(
            self,
            Field::RegistrationAmount
                | Field::AllotmentAmount
                | Field::SalePrice
                | Field::LeaseRent
                | Field::ServiceCharges
        )
    }
}

// Typed view of one cell. Numbers compare by value, text lexicographically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(u64),
    Text(&'a str),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

// Total order over optional cell values: absent sorts before present.
pub fn compare_values(a: Option<FieldValue>, b: Option<FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(FieldValue::Number(x)), Some(FieldValue::Number(y))) => x.cmp(&y),
        (Some(FieldValue::Text(x)), Some(FieldValue::Text(y))) => x.cmp(y),
        (Some(FieldValue::Number(_)), Some(FieldValue::Text(_))) => Ordering::Less,
        (Some(FieldValue::Text(_)), Some(FieldValue::Number(_))) => Ordering::Greater,
    }
}

impl PropertyRecord {
    pub fn value(&self, field: Field) -> Option<FieldValue<'_>> {
        match field {
            Field::Id => Some(FieldValue::Number(self.id)),
            Field::SchemeName => Some(FieldValue::Text(&self.scheme_name)),
            Field::UniqueId => Some(FieldValue::Text(&self.unique_id)),
            Field::OwnerName => Some(FieldValue::Text(&self.owner_name)),
            Field::FatherName => Some(FieldValue::Text(&self.father_name)),
            Field::Category => Some(FieldValue::Text(&self.category)),
            Field::PlotNumber => Some(FieldValue::Text(&self.plot_number)),
            Field::RegistrationAmount => Some(FieldValue::Number(self.registration_amount)),
            Field::RegistrationDate => Some(FieldValue::Text(&self.registration_date)),
            Field::PermanentAddress => Some(FieldValue::Text(&self.permanent_address)),
            Field::CurrentAddress => Some(FieldValue::Text(&self.current_address)),
            Field::Mobile => self.mobile.as_deref().map(FieldValue::Text),
            Field::AllotmentAmount => self.allotment_amount.map(FieldValue::Number),
            Field::AllotmentDate => self.allotment_date.as_deref().map(FieldValue::Text),
            Field::SalePrice => self.sale_price.map(FieldValue::Number),
            Field::LeaseRent => self.lease_rent.map(FieldValue::Number),
            Field::ServiceCharges => self.service_charges.map(FieldValue::Number),
        }
    }
}

/// The read-only, ordered record sequence backing the table.
#[derive(Debug)]
pub struct RecordSource {
    records: Vec<PropertyRecord>,
}

impl RecordSource {
    pub fn from_records(records: Vec<PropertyRecord>) -> Result<Self, PVError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(PVError::DuplicateId(record.id));
            }
        }
        Ok(RecordSource { records })
    }

    pub fn sample() -> Result<Self, PVError> {
        let records: Vec<PropertyRecord> = serde_json::from_str(SAMPLE_RECORDS)?;
        debug!("Parsed {} bundled sample records", records.len());
        Self::from_records(records)
    }

    pub fn load_file(path: &Path) -> Result<Self, PVError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PVError::FileNotFound,
            ErrorKind::PermissionDenied => PVError::PermissionDenied,
            _ => PVError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(PVError::LoadingFailed("Not a file!".into()));
        }
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("JSON") => {}
            _ => return Err(PVError::UnknownFileType),
        }

        let raw = fs::read_to_string(path)?;
        let records: Vec<PropertyRecord> = serde_json::from_str(&raw)?;
        info!("Loaded {} records from {}", records.len(), path.display());
        Self::from_records(records)
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> &PropertyRecord {
        &self.records[idx]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Distinct categories with their record counts, most frequent first.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
        let mut sorted: Vec<(usize, String)> = counts.into_iter().map(|(k, v)| (v, k)).collect();
        sorted.sort_unstable();
        sorted.reverse();
        sorted.into_iter().map(|(count, value)| (value, count)).collect()
    }
}
