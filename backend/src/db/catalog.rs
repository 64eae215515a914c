//! Product and category operations.
//!
//! Slugs are unique per file; uniqueness is checked by a linear scan under the file lock.

use super::repository::{new_id, now, optional, required};
use super::Repository;
use crate::errors::AppError;
use crate::models::{
    slugify, Category, CreateCategoryRequest, CreateProductRequest, Product,
    UpdateCategoryRequest, UpdateProductRequest,
};

/// Resolve the slug to store: an explicit slug is normalized, otherwise derived from the name.
fn resolve_slug(explicit: Option<&String>, name: &str) -> Result<String, AppError> {
    let slug = match explicit.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Slug must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

impl Repository {
    // ==================== CATEGORY OPERATIONS ====================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let mut categories = self.categories.load().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub async fn create_category(&self, request: &CreateCategoryRequest) -> Result<Category, AppError> {
        let name = required(&request.name, "Name")?;
        let slug = resolve_slug(request.slug.as_ref(), &name)?;

        let mut categories = self.categories.lock().await?;
        if categories.iter().any(|c| c.slug == slug) {
            return Err(AppError::Validation(format!(
                "A category with slug {} already exists",
                slug
            )));
        }

        let now = now();
        let category = Category {
            id: new_id(),
            name,
            slug,
            description: optional(request.description.as_ref()),
            created_at: now.clone(),
            updated_at: now,
        };
        categories.push(category.clone());
        categories.commit().await?;

        tracing::info!("Created category {} ({})", category.slug, category.id);
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: &str,
        request: &UpdateCategoryRequest,
    ) -> Result<Category, AppError> {
        let mut categories = self.categories.lock().await?;

        let new_slug = match &request.slug {
            Some(slug) => Some(resolve_slug(Some(slug), "")?),
            None => None,
        };
        if let Some(slug) = &new_slug {
            if categories.iter().any(|c| &c.slug == slug && c.id != id) {
                return Err(AppError::Validation(format!(
                    "A category with slug {} already exists",
                    slug
                )));
            }
        }

        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(name) = &request.name {
            category.name = required(name, "Name")?;
        }
        if let Some(slug) = new_slug {
            category.slug = slug;
        }
        if request.description.is_some() {
            category.description = optional(request.description.as_ref());
        }
        category.updated_at = now();

        let updated = category.clone();
        categories.commit().await?;

        tracing::info!("Updated category {}", updated.id);
        Ok(updated)
    }

    /// Delete a category. Categories still holding products cannot be deleted.
    pub async fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let products = self.products.lock().await?;
        let mut categories = self.categories.lock().await?;

        if !categories.iter().any(|c| c.id == id) {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        let in_use = products
            .iter()
            .filter(|p| p.category_id.as_deref() == Some(id))
            .count();
        if in_use > 0 {
            return Err(AppError::Validation(format!(
                "Category still contains {} product(s)",
                in_use
            )));
        }

        categories.retain(|c| c.id != id);
        categories.commit().await?;

        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    // ==================== PRODUCT OPERATIONS ====================

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let mut products = self.products.load().await?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, AppError> {
        let products = self.products.load().await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>, AppError> {
        let products = self.products.load().await?;
        Ok(products.into_iter().find(|p| p.slug == slug))
    }

    pub async fn create_product(&self, request: &CreateProductRequest) -> Result<Product, AppError> {
        let name = required(&request.name, "Name")?;
        let slug = resolve_slug(request.slug.as_ref(), &name)?;
        self.ensure_category_exists(request.category_id.as_deref())
            .await?;

        let mut products = self.products.lock().await?;
        if products.iter().any(|p| p.slug == slug) {
            return Err(AppError::Validation(format!(
                "A product with slug {} already exists",
                slug
            )));
        }

        let now = now();
        let product = Product {
            id: new_id(),
            name,
            slug,
            description: optional(request.description.as_ref()),
            price: request.price,
            category_id: optional(request.category_id.as_ref()),
            images: request.images.clone(),
            colors: request.colors.clone(),
            stock: request.stock.clone(),
            active: request.active,
            created_at: now.clone(),
            updated_at: now,
        };
        products.push(product.clone());
        products.commit().await?;

        tracing::info!("Created product {} ({})", product.slug, product.id);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        request: &UpdateProductRequest,
    ) -> Result<Product, AppError> {
        if request.category_id.is_some() {
            self.ensure_category_exists(request.category_id.as_deref())
                .await?;
        }

        let mut products = self.products.lock().await?;

        let new_slug = match &request.slug {
            Some(slug) => Some(resolve_slug(Some(slug), "")?),
            None => None,
        };
        if let Some(slug) = &new_slug {
            if products.iter().any(|p| &p.slug == slug && p.id != id) {
                return Err(AppError::Validation(format!(
                    "A product with slug {} already exists",
                    slug
                )));
            }
        }

        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))?;

        if let Some(name) = &request.name {
            product.name = required(name, "Name")?;
        }
        if let Some(slug) = new_slug {
            product.slug = slug;
        }
        if request.description.is_some() {
            product.description = optional(request.description.as_ref());
        }
        if let Some(price) = request.price {
            product.price = price;
        }
        if request.category_id.is_some() {
            product.category_id = optional(request.category_id.as_ref());
        }
        if let Some(images) = &request.images {
            product.images = images.clone();
        }
        if let Some(colors) = &request.colors {
            product.colors = colors.clone();
        }
        if let Some(stock) = &request.stock {
            product.stock = stock.clone();
        }
        if let Some(active) = request.active {
            product.active = active;
        }
        product.updated_at = now();

        let updated = product.clone();
        products.commit().await?;

        tracing::info!("Updated product {}", updated.id);
        Ok(updated)
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), AppError> {
        let mut products = self.products.lock().await?;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(AppError::NotFound(format!("Product {} not found", id)));
        }
        products.commit().await?;

        tracing::info!("Deleted product {}", id);
        Ok(())
    }

    /// A blank category id means "uncategorized" and always passes.
    async fn ensure_category_exists(&self, category_id: Option<&str>) -> Result<(), AppError> {
        let Some(category_id) = category_id.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        let categories = self.categories.load().await?;
        if categories.iter().any(|c| c.id == category_id) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Unknown category {}",
                category_id
            )))
        }
    }
}
