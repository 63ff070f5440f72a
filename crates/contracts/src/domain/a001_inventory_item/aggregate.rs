use crate::enums::InventoryCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Физическое состояние позиции (задается пользователем)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    #[default]
    Good,
    Damaged,
}

impl ItemCondition {
    pub fn code(&self) -> &'static str {
        match self {
            ItemCondition::Good => "good",
            ItemCondition::Damaged => "damaged",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "good" => Some(ItemCondition::Good),
            "damaged" => Some(ItemCondition::Damaged),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Идентификатор, назначенный хранилищем (пустой до вставки)
    pub id: String,

    pub name: String,

    pub category: InventoryCategory,

    /// Количество, никогда не бывает отрицательным
    pub quantity: u32,

    pub expiry_date: Option<NaiveDate>,

    #[serde(default)]
    pub condition: ItemCondition,

    pub assigned_to: Option<String>,

    pub supplier: Option<String>,

    pub campus_ref: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    pub fn new_for_insert(
        category: InventoryCategory,
        name: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            category,
            quantity,
            expiry_date: None,
            condition: ItemCondition::Good,
            assigned_to: None,
            supplier: None,
            campus_ref: None,
            updated_at: None,
        }
    }

    /// Собрать новую запись из формы. Валидация выполняется до записи.
    pub fn from_dto(dto: &InventoryItemDto) -> Result<Self, String> {
        let mut item = Self::new_for_insert(dto.category, String::new(), 0);
        item.apply_dto(dto)?;
        Ok(item)
    }

    /// Применить изменения из формы редактирования.
    ///
    /// Категория и id не меняются: категория определяет коллекцию.
    pub fn update(&mut self, dto: &InventoryItemDto) -> Result<(), String> {
        if dto.category != self.category {
            return Err(format!(
                "Category cannot be changed from {} to {}",
                self.category, dto.category
            ));
        }
        let mut candidate = self.clone();
        candidate.apply_dto(dto)?;
        *self = candidate;
        Ok(())
    }

    fn apply_dto(&mut self, dto: &InventoryItemDto) -> Result<(), String> {
        self.name = dto.name.trim().to_string();
        self.quantity = parse_quantity(dto.quantity)?;
        self.expiry_date = parse_optional_date(dto.expiry_date.as_deref())?;
        if let Some(condition) = dto.condition {
            self.condition = condition;
        }
        self.assigned_to = non_blank(dto.assigned_to.as_deref());
        self.supplier = non_blank(dto.supplier.as_deref());
        self.campus_ref = non_blank(dto.campus_ref.as_deref());
        self.validate()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name must not be empty".into());
        }
        if self.name.chars().count() > 120 {
            return Err("Name must not exceed 120 characters".into());
        }
        if self.condition == ItemCondition::Damaged && !self.category.tracks_condition() {
            return Err(format!(
                "Category {} does not track physical condition",
                self.category
            ));
        }
        Ok(())
    }

    /// Списать единицы. Остаток не уходит ниже нуля.
    ///
    /// Возвращает фактически списанное количество.
    pub fn deduct(&mut self, units: u32) -> u32 {
        let deducted = units.min(self.quantity);
        self.quantity -= deducted;
        deducted
    }

    pub fn set_condition(&mut self, condition: ItemCondition) -> Result<(), String> {
        if condition == ItemCondition::Damaged && !self.category.tracks_condition() {
            return Err(format!(
                "Category {} does not track physical condition",
                self.category
            ));
        }
        self.condition = condition;
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

// ============================================================================
// DTO (форма создания/редактирования)
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDto {
    pub id: Option<String>,
    pub name: String,
    pub category: InventoryCategory,
    /// Сырое значение из формы, проверяется на отрицательность
    pub quantity: i64,
    /// Формат YYYY-MM-DD, пустая строка означает "без срока"
    pub expiry_date: Option<String>,
    pub condition: Option<ItemCondition>,
    pub assigned_to: Option<String>,
    pub supplier: Option<String>,
    pub campus_ref: Option<String>,
}

/// Списание со склада
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductDto {
    pub units: i64,
}

impl DeductDto {
    pub fn validated_units(&self) -> Result<u32, String> {
        if self.units <= 0 {
            return Err("Units to deduct must be positive".into());
        }
        u32::try_from(self.units).map_err(|_| format!("Units {} is too large", self.units))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDto {
    pub condition: ItemCondition,
}

fn parse_quantity(raw: i64) -> Result<u32, String> {
    if raw < 0 {
        return Err("Quantity must not be negative".into());
    }
    u32::try_from(raw).map_err(|_| format!("Quantity {} is too large", raw))
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("Invalid expiry date '{}', expected YYYY-MM-DD", s)),
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(category: InventoryCategory, name: &str, quantity: i64) -> InventoryItemDto {
        InventoryItemDto {
            id: None,
            name: name.to_string(),
            category,
            quantity,
            expiry_date: None,
            condition: None,
            assigned_to: None,
            supplier: Some("  ".to_string()),
            campus_ref: None,
        }
    }

    #[test]
    fn test_deduct_clamps_at_zero() {
        let mut item = InventoryItem::new_for_insert(InventoryCategory::Health, "Paracetamol", 3);
        let deducted = item.deduct(5);
        assert_eq!(item.quantity, 0);
        assert_eq!(deducted, 3);
    }

    #[test]
    fn test_from_dto_rejects_negative_quantity() {
        let err = InventoryItem::from_dto(&dto(InventoryCategory::Food, "Rice", -1)).unwrap_err();
        assert!(err.contains("negative"));
    }

    #[test]
    fn test_from_dto_rejects_blank_name() {
        assert!(InventoryItem::from_dto(&dto(InventoryCategory::Food, "   ", 4)).is_err());
    }

    #[test]
    fn test_from_dto_parses_expiry_and_drops_blank_fields() {
        let mut form = dto(InventoryCategory::Food, " Rice ", 12);
        form.expiry_date = Some("2026-03-01".to_string());
        let item = InventoryItem::from_dto(&form).unwrap();
        assert_eq!(item.name, "Rice");
        assert_eq!(item.expiry_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(item.supplier, None);

        form.expiry_date = Some("01/03/2026".to_string());
        assert!(InventoryItem::from_dto(&form).is_err());
    }

    #[test]
    fn test_damaged_only_for_condition_tracked_categories() {
        let mut item =
            InventoryItem::new_for_insert(InventoryCategory::OfficeSupplies, "Stapler", 4);
        assert!(item.set_condition(ItemCondition::Damaged).is_err());

        let mut laptop = InventoryItem::new_for_insert(InventoryCategory::It, "ThinkPad", 4);
        laptop.set_condition(ItemCondition::Damaged).unwrap();
        assert_eq!(laptop.condition, ItemCondition::Damaged);
    }

    #[test]
    fn test_deduct_dto_requires_positive_units() {
        assert_eq!(DeductDto { units: 5 }.validated_units(), Ok(5));
        assert!(DeductDto { units: 0 }.validated_units().is_err());
        assert!(DeductDto { units: -2 }.validated_units().is_err());
    }

    #[test]
    fn test_update_keeps_item_on_validation_failure() {
        let mut item = InventoryItem::new_for_insert(InventoryCategory::Food, "Rice", 10);
        let err = item.update(&dto(InventoryCategory::Food, "", 3));
        assert!(err.is_err());
        assert_eq!(item.name, "Rice");
        assert_eq!(item.quantity, 10);

        assert!(item.update(&dto(InventoryCategory::Health, "Rice", 3)).is_err());
    }
}
