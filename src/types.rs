use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One data line of the published sheet, mapped by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub serial_no: String,
    pub district_name: String,
    pub lsg: String,
    pub ward_no: String,
    pub medical_officer: ContactInfo,
    pub asha_worker: ContactInfo,
    pub lsgd_ward_member: ContactInfo,
    pub kudumba_shree: ContactInfo,
    pub anganawadi_teacher: ContactInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ward_no: u32,
    pub medical_officer: ContactInfo,
    pub asha_worker: ContactInfo,
    pub lsgd_ward_member: ContactInfo,
    pub kudumba_shree: ContactInfo,
    pub anganawadi_teacher: ContactInfo,
}

impl Ward {
    /// Build a ward from a row's contact columns. The name is filled in by the
    /// caller when resolution is enabled.
    pub fn from_row(ward_no: u32, row: &Row) -> Self {
        Self {
            name: None,
            ward_no,
            medical_officer: row.medical_officer.clone(),
            asha_worker: row.asha_worker.clone(),
            lsgd_ward_member: row.lsgd_ward_member.clone(),
            kudumba_shree: row.kudumba_shree.clone(),
            anganawadi_teacher: row.anganawadi_teacher.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DivisionType {
    District,
    Grama,
    Block,
    Municipality,
    Corporation,
}

impl DivisionType {
    /// Suffixes the sheet uses after a division name of this type. The first
    /// entry is the canonical one.
    pub fn label_suffixes(self) -> &'static [&'static str] {
        match self {
            DivisionType::District => &["District Panchayat", "District"],
            DivisionType::Grama => &["Grama Panchayat"],
            DivisionType::Block => &["Block Panchayat"],
            // upstream misspells this one more often than not
            DivisionType::Municipality => &["Municipality", "Muncipality"],
            DivisionType::Corporation => &["Corporation"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DivisionType::District => "District",
            DivisionType::Grama => "Grama",
            DivisionType::Block => "Block",
            DivisionType::Municipality => "Municipality",
            DivisionType::Corporation => "Corporation",
        }
    }
}

/// A local self-government division and its wards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lsgd {
    pub district: String,
    pub lsg: String,
    pub wards: Vec<Ward>,
    #[serde(rename = "type")]
    pub kind: DivisionType,
    /// Division label exactly as it appeared in the sheet.
    #[serde(skip)]
    pub raw_label: String,
}

impl Lsgd {
    pub fn has_ward(&self, ward_no: u32) -> bool {
        self.wards.iter().any(|w| w.ward_no == ward_no)
    }

    /// Labels the sheet would use for this division: `"<lsg> <suffix>"`
    /// for every known suffix of its type.
    pub fn reconstructed_labels(&self) -> Vec<String> {
        self.kind
            .label_suffixes()
            .iter()
            .map(|suffix| format!("{} {}", self.lsg, suffix))
            .collect()
    }
}

/// Local body entry of the remote directory service.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalBody {
    pub name: String,
    #[serde(default)]
    pub wards: Vec<DirectoryWard>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryWard {
    pub number: u32,
    pub name: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct LsgdPreviewRow {
    #[tabled(rename = "District")]
    pub district: String,
    #[tabled(rename = "LSG")]
    pub lsg: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Wards")]
    pub wards: usize,
    #[tabled(rename = "Named")]
    pub named: usize,
}

impl From<&Lsgd> for LsgdPreviewRow {
    fn from(d: &Lsgd) -> Self {
        Self {
            district: d.district.clone(),
            lsg: d.lsg.clone(),
            kind: d.kind.as_str().to_string(),
            wards: d.wards.len(),
            named: d
                .wards
                .iter()
                .filter(|w| w.name.as_deref().is_some_and(|n| !n.is_empty()))
                .count(),
        }
    }
}
