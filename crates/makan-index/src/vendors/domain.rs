use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Malaysian states and federal territories a vendor can belong to.
/// Serialized by display name so stored records stay human-readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Kuala Lumpur")]
    KualaLumpur,
    Selangor,
    Penang,
    Johor,
    Perak,
    Melaka,
    Sabah,
    Sarawak,
    Kedah,
    Pahang,
    Terengganu,
    Kelantan,
    #[serde(rename = "Negeri Sembilan")]
    NegeriSembilan,
    Perlis,
    Putrajaya,
    Labuan,
}

impl Region {
    pub const fn ordered() -> [Self; 16] {
        [
            Self::KualaLumpur,
            Self::Selangor,
            Self::Penang,
            Self::Johor,
            Self::Perak,
            Self::Melaka,
            Self::Sabah,
            Self::Sarawak,
            Self::Kedah,
            Self::Pahang,
            Self::Terengganu,
            Self::Kelantan,
            Self::NegeriSembilan,
            Self::Perlis,
            Self::Putrajaya,
            Self::Labuan,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::KualaLumpur => "Kuala Lumpur",
            Self::Selangor => "Selangor",
            Self::Penang => "Penang",
            Self::Johor => "Johor",
            Self::Perak => "Perak",
            Self::Melaka => "Melaka",
            Self::Sabah => "Sabah",
            Self::Sarawak => "Sarawak",
            Self::Kedah => "Kedah",
            Self::Pahang => "Pahang",
            Self::Terengganu => "Terengganu",
            Self::Kelantan => "Kelantan",
            Self::NegeriSembilan => "Negeri Sembilan",
            Self::Perlis => "Perlis",
            Self::Putrajaya => "Putrajaya",
            Self::Labuan => "Labuan",
        }
    }

    /// Normalize a geocoder-reported state name. Nominatim mixes Malay and
    /// English spellings and prefixes federal territories, so this matches on
    /// known aliases rather than the serialized display name alone.
    pub fn from_geocoded(raw: &str) -> Option<Self> {
        let name = raw.trim().to_ascii_lowercase();
        let name = name
            .strip_prefix("federal territory of ")
            .or_else(|| name.strip_prefix("wilayah persekutuan "))
            .unwrap_or(&name);

        match name {
            "kuala lumpur" => Some(Self::KualaLumpur),
            "selangor" => Some(Self::Selangor),
            "penang" | "pulau pinang" => Some(Self::Penang),
            "johor" | "johore" => Some(Self::Johor),
            "perak" => Some(Self::Perak),
            "melaka" | "malacca" => Some(Self::Melaka),
            "sabah" => Some(Self::Sabah),
            "sarawak" => Some(Self::Sarawak),
            "kedah" => Some(Self::Kedah),
            "pahang" => Some(Self::Pahang),
            "terengganu" => Some(Self::Terengganu),
            "kelantan" => Some(Self::Kelantan),
            "negeri sembilan" => Some(Self::NegeriSembilan),
            "perlis" => Some(Self::Perlis),
            "putrajaya" => Some(Self::Putrajaya),
            "labuan" => Some(Self::Labuan),
            _ => None,
        }
    }
}

/// One reviewed food establishment. `id` is unique across the collection;
/// uniqueness is enforced at insert time by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub state: Region,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub jason_score: f64,
    #[serde(default)]
    pub keypoints: Vec<String>,
    pub tiktok_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    pub image_url: String,
    pub review_date: NaiveDate,
}

pub const MAX_KEYPOINTS: usize = 3;

impl Vendor {
    /// Check the record invariants enforced on create and update.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        validate_score(self.jason_score)?;
        validate_keypoints(&self.keypoints)?;
        Ok(())
    }
}

pub(crate) fn validate_score(score: f64) -> Result<(), ValidationError> {
    if !(0.0..=10.0).contains(&score) {
        return Err(ValidationError::ScoreOutOfRange(score));
    }
    Ok(())
}

pub(crate) fn validate_keypoints(keypoints: &[String]) -> Result<(), ValidationError> {
    if keypoints.len() > MAX_KEYPOINTS {
        return Err(ValidationError::TooManyKeypoints(keypoints.len()));
    }
    Ok(())
}

/// Partial update for a vendor. Absent fields keep the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub state: Option<Region>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub jason_score: Option<f64>,
    pub keypoints: Option<Vec<String>>,
    pub tiktok_url: Option<String>,
    pub maps_url: Option<String>,
    pub image_url: Option<String>,
    pub review_date: Option<NaiveDate>,
}

impl VendorPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(score) = self.jason_score {
            validate_score(score)?;
        }
        if let Some(keypoints) = &self.keypoints {
            validate_keypoints(keypoints)?;
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptyName);
            }
        }
        Ok(())
    }

    pub fn apply(&self, vendor: &mut Vendor) {
        if let Some(name) = &self.name {
            vendor.name = name.clone();
        }
        if let Some(state) = self.state {
            vendor.state = state;
        }
        if let Some(address) = &self.address {
            vendor.address = address.clone();
        }
        if let Some(latitude) = self.latitude {
            vendor.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            vendor.longitude = longitude;
        }
        if let Some(score) = self.jason_score {
            vendor.jason_score = score;
        }
        if let Some(keypoints) = &self.keypoints {
            vendor.keypoints = keypoints.clone();
        }
        if let Some(tiktok_url) = &self.tiktok_url {
            vendor.tiktok_url = tiktok_url.clone();
        }
        if let Some(maps_url) = &self.maps_url {
            vendor.maps_url = Some(maps_url.clone());
        }
        if let Some(image_url) = &self.image_url {
            vendor.image_url = image_url.clone();
        }
        if let Some(review_date) = self.review_date {
            vendor.review_date = review_date;
        }
    }
}

/// Invariant violations rejected before a record reaches the store.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("vendor id must not be empty")]
    EmptyId,
    #[error("vendor name must not be empty")]
    EmptyName,
    #[error("jason_score {0} is outside 0.0..=10.0")]
    ScoreOutOfRange(f64),
    #[error("at most {MAX_KEYPOINTS} keypoints allowed, got {0}")]
    TooManyKeypoints(usize),
}
