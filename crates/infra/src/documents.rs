//! Collection bindings for the persisted entity types.

use catalog_auth::User;
use catalog_core::{CategoryId, ProductId, UserId};
use catalog_products::{Category, Product};

use crate::store::Document;

impl Document for User {
    type Id = UserId;
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Document for Category {
    type Id = CategoryId;
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &CategoryId {
        &self.id
    }
}

impl Document for Product {
    type Id = ProductId;
    const COLLECTION: &'static str = "products";

    fn id(&self) -> &ProductId {
        &self.id
    }
}
