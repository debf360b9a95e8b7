//! Service catalog
//!
//! The catalog is static and ships with the client. The backend may override
//! individual fields of a service, see [`ServiceOverride`].

use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Service identifier.
pub type ServiceId = TypedId<ServiceSnapshot>;

/// Service provider identifier.
pub type ProviderId = TypedId<Provider>;

/// Marker for provider identifiers.
#[derive(Debug)]
pub struct Provider;

/// Denormalized, read-mostly catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    /// Service identifier.
    pub id: ServiceId,

    /// Display name.
    pub name: String,

    /// Category display name.
    pub category: String,

    /// Price in whole rupees.
    pub price: u64,

    /// Average rating out of five.
    pub rating: f64,

    /// Image URL.
    pub image: String,

    /// Long description.
    pub description: String,

    /// Typical duration, e.g. "2 hours".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Provider offering this service, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<ProviderId>,
}

/// Field overrides for a catalog entry; absent fields keep the catalog value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceOverride {
    /// Replacement name.
    #[serde(default)]
    pub name: Option<String>,

    /// Replacement category.
    #[serde(default)]
    pub category: Option<String>,

    /// Replacement price.
    #[serde(default)]
    pub price: Option<u64>,

    /// Replacement rating.
    #[serde(default)]
    pub rating: Option<f64>,

    /// Replacement image.
    #[serde(default)]
    pub image: Option<String>,

    /// Replacement description.
    #[serde(default)]
    pub description: Option<String>,

    /// Replacement duration.
    #[serde(default)]
    pub duration: Option<String>,

    /// Replacement provider.
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
}

impl ServiceSnapshot {
    /// Apply the fields present in `update`, leaving the rest untouched.
    pub fn apply_override(&mut self, update: ServiceOverride) {
        let ServiceOverride {
            name,
            category,
            price,
            rating,
            image,
            description,
            duration,
            provider_id,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if duration.is_some() {
            self.duration = duration;
        }
        if provider_id.is_some() {
            self.provider_id = provider_id;
        }
    }
}

/// A group of related services.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCategory {
    /// Category identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Image URL.
    pub image: String,

    /// Services in this category.
    pub services: Vec<ServiceSnapshot>,
}

/// The built-in service catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<ServiceCategory>,
}

impl Catalog {
    /// Build a catalog from explicit categories.
    #[must_use]
    pub fn new(categories: Vec<ServiceCategory>) -> Self {
        Self { categories }
    }

    /// The catalog shipped with the client.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = CATALOG
            .iter()
            .map(|(id, name, image, services)| ServiceCategory {
                id: (*id).to_string(),
                name: (*name).to_string(),
                image: (*image).to_string(),
                services: services
                    .iter()
                    .map(|(service_id, service_name, price, rating, description)| {
                        ServiceSnapshot {
                            id: ServiceId::new(*service_id),
                            name: (*service_name).to_string(),
                            category: (*name).to_string(),
                            price: *price,
                            rating: *rating,
                            image: format!("{IMAGE_BASE}/services/{service_id}.jpg"),
                            description: (*description).to_string(),
                            duration: None,
                            provider_id: None,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self { categories }
    }

    /// All categories in display order.
    #[must_use]
    pub fn categories(&self) -> &[ServiceCategory] {
        &self.categories
    }

    /// Find a category by id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&ServiceCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Iterate over every service in the catalog.
    pub fn services(&self) -> impl Iterator<Item = &ServiceSnapshot> {
        self.categories
            .iter()
            .flat_map(|category| category.services.iter())
    }

    /// Find a service by id.
    #[must_use]
    pub fn service(&self, id: &ServiceId) -> Option<&ServiceSnapshot> {
        self.services().find(|service| &service.id == id)
    }

    /// Services whose name or category contains `term`, ignoring case.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&ServiceSnapshot> {
        let term = term.trim().to_lowercase();

        self.services()
            .filter(|service| {
                term.is_empty()
                    || service.name.to_lowercase().contains(&term)
                    || service.category.to_lowercase().contains(&term)
            })
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const IMAGE_BASE: &str = "https://images.homefix.app";

type ServiceRow = (&'static str, &'static str, u64, f64, &'static str);

const CATALOG: &[(&str, &str, &str, &[ServiceRow])] = &[
    (
        "1",
        "Automobile & Roadside Assistance",
        "https://images.homefix.app/categories/1.jpg",
        &[
            (
                "101",
                "Emergency Tire Puncture Repair",
                499,
                4.8,
                "On-the-spot tire puncture repair for bikes & cars with professional tools and quick service",
            ),
            (
                "102",
                "Battery Jump Start Service",
                599,
                4.7,
                "Quick battery jumpstart service for all vehicle types",
            ),
            (
                "103",
                "Emergency Fuel Delivery",
                799,
                4.9,
                "Rapid fuel delivery service when you run out of gas",
            ),
        ],
    ),
    (
        "2",
        "Home Repair & Maintenance",
        "https://images.homefix.app/categories/2.jpg",
        &[
            (
                "201",
                "Professional Plumbing Service",
                799,
                4.6,
                "Expert plumbing repairs and maintenance services",
            ),
            (
                "202",
                "Electrical Wiring & Repairs",
                699,
                4.7,
                "Professional electrical repair and installation services",
            ),
            (
                "203",
                "Roof Leakage Repair",
                1499,
                4.8,
                "Waterproofing and leak repair for roofs and terraces",
            ),
        ],
    ),
    (
        "3",
        "Tech & Gadgets Repair",
        "https://images.homefix.app/categories/3.jpg",
        &[
            (
                "301",
                "Laptop Repair Service",
                999,
                4.5,
                "Hardware and software repair for all laptop brands",
            ),
            (
                "302",
                "CCTV Installation",
                2499,
                4.6,
                "Camera installation and configuration for homes and offices",
            ),
            (
                "303",
                "Smart Lock Installation",
                1999,
                4.7,
                "Installation and setup of smart door locks",
            ),
        ],
    ),
    (
        "4",
        "Industrial & Commercial",
        "https://images.homefix.app/categories/4.jpg",
        &[
            (
                "401",
                "Welding Service",
                1499,
                4.6,
                "On-site welding and metal fabrication",
            ),
            (
                "402",
                "AC Duct Cleaning",
                3999,
                4.5,
                "Deep cleaning of commercial air-conditioning ducts",
            ),
            (
                "403",
                "Fire Safety Maintenance",
                2499,
                4.7,
                "Inspection and servicing of extinguishers and alarms",
            ),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn builtin_catalog_has_four_categories_of_three() {
        let catalog = Catalog::builtin();

        assert_eq!(catalog.categories().len(), 4);
        assert!(
            catalog
                .categories()
                .iter()
                .all(|category| category.services.len() == 3),
            "every category should carry three services"
        );
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::builtin();
        let service = catalog.service(&ServiceId::new("101"));

        assert_eq!(service.map(|s| s.price), Some(499));
        assert_eq!(
            service.map(|s| s.category.as_str()),
            Some("Automobile & Roadside Assistance")
        );
        assert!(catalog.service(&ServiceId::new("999")).is_none());
    }

    #[test]
    fn search_matches_name_and_category() {
        let catalog = Catalog::builtin();

        assert_eq!(catalog.search("plumbing").len(), 1);
        assert_eq!(catalog.search("TECH").len(), 3);
        assert_eq!(catalog.search("").len(), 12);
    }

    #[test]
    fn override_replaces_only_present_fields() -> TestResult {
        let catalog = Catalog::builtin();
        let mut service = catalog
            .service(&ServiceId::new("202"))
            .cloned()
            .ok_or("service 202 missing")?;

        service.apply_override(ServiceOverride {
            price: Some(749),
            provider_id: Some(ProviderId::new("prov-7")),
            ..ServiceOverride::default()
        });

        assert_eq!(service.price, 749);
        assert_eq!(service.name, "Electrical Wiring & Repairs");
        assert_eq!(service.provider_id, Some(ProviderId::new("prov-7")));

        Ok(())
    }
}
