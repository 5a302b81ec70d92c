use uuid::Uuid;

use crate::errors::ServiceError;

/// Canonical form of a recipe line's ingredient reference.
///
/// A line points at the catalog directly, or names an ingredient that is not
/// in the catalog yet. The two raw columns (`ingredient_id`,
/// `ingredient_name`) are never interpreted with null-precedence logic:
/// callers build an `IngredientRef` and match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngredientRef {
    /// Direct reference to a catalog ingredient.
    Direct(Uuid),
    /// Free-text name with the unit the chef measured it in. The unit is
    /// mandatory when a line is saved; rows predating that rule resolve with
    /// an empty display unit.
    FreeText { name: String, unit_id: Option<Uuid> },
}

impl IngredientRef {
    /// Builds the canonical reference from raw row parts. A present direct
    /// reference wins and the free-text fields are discarded.
    pub fn from_parts(
        ingredient_id: Option<Uuid>,
        ingredient_name: &str,
        unit_id: Option<Uuid>,
    ) -> Self {
        match ingredient_id {
            Some(id) => IngredientRef::Direct(id),
            None => IngredientRef::FreeText {
                name: ingredient_name.trim().to_string(),
                unit_id,
            },
        }
    }

    /// Validates a line about to be persisted. Exactly one form must be
    /// usable: a direct reference, or non-empty free text with an explicit
    /// unit.
    pub fn validate_for_save(&self) -> Result<(), ServiceError> {
        match self {
            IngredientRef::Direct(_) => Ok(()),
            IngredientRef::FreeText { name, unit_id } => {
                if name.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "ingredient line needs a catalog ingredient or a name".to_string(),
                    ));
                }
                if unit_id.is_none() {
                    return Err(ServiceError::ValidationError(format!(
                        "free-text ingredient \"{name}\" needs a unit"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn direct_reference_discards_free_text() {
        let id = Uuid::new_v4();
        let unit = Uuid::new_v4();
        let r = IngredientRef::from_parts(Some(id), "Flour", Some(unit));
        assert_eq!(r, IngredientRef::Direct(id));
        assert!(r.validate_for_save().is_ok());
    }

    #[test]
    fn free_text_requires_unit() {
        let r = IngredientRef::from_parts(None, "Saffron", None);
        assert_matches!(r.validate_for_save(), Err(ServiceError::ValidationError(_)));

        let r = IngredientRef::from_parts(None, "Saffron", Some(Uuid::new_v4()));
        assert!(r.validate_for_save().is_ok());
    }

    #[test]
    fn empty_line_is_invalid() {
        let r = IngredientRef::from_parts(None, "  ", None);
        assert_matches!(r.validate_for_save(), Err(ServiceError::ValidationError(_)));
    }
}
