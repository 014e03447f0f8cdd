use tracing::warn;

use crate::ledger::{Category, Ledger, TransactionKind};

use super::{ServiceError, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    /// Appends a category with a fresh id and returns it.
    pub fn add(ledger: &mut Ledger, name: &str, kind: TransactionKind) -> ServiceResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Category name cannot be empty".into()));
        }
        if ledger
            .categories
            .iter()
            .any(|existing| existing.kind == kind && existing.name.eq_ignore_ascii_case(name))
        {
            warn!(name, kind = %kind, "adding a category whose name already exists");
        }
        let category = Category::new(name, kind);
        ledger.categories.push(category.clone());
        Ok(category)
    }

    /// Removes a category by id. Transactions that reference it by name keep
    /// the reference.
    pub fn remove(ledger: &mut Ledger, id: &str) -> ServiceResult<Category> {
        let position = ledger
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Category `{id}` not found")))?;
        Ok(ledger.categories.remove(position))
    }

    pub fn list_for(ledger: &Ledger, kind: TransactionKind) -> Vec<&Category> {
        ledger.categories_for(kind)
    }
}
