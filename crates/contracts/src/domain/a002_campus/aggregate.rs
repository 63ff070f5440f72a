use serde::{Deserialize, Serialize};

/// Кампус организации
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub id: String,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
}

impl Campus {
    pub fn from_dto(dto: &CampusDto) -> Result<Self, String> {
        let campus = Self {
            id: String::new(),
            code: dto.code.trim().to_uppercase(),
            name: dto.name.trim().to_string(),
            address: dto
                .address
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        campus.validate()?;
        Ok(campus)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Campus name must not be empty".into());
        }
        if self.code.is_empty() {
            return Err("Campus code must not be empty".into());
        }
        if !self.code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Campus code may contain only letters, digits and '-'".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusDto {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dto_normalizes_code() {
        let campus = Campus::from_dto(&CampusDto {
            code: " north-1 ".into(),
            name: "North Campus".into(),
            address: Some("".into()),
        })
        .unwrap();
        assert_eq!(campus.code, "NORTH-1");
        assert_eq!(campus.address, None);
    }

    #[test]
    fn test_rejects_code_with_spaces() {
        assert!(Campus::from_dto(&CampusDto {
            code: "north 1".into(),
            name: "North".into(),
            address: None,
        })
        .is_err());
    }
}
