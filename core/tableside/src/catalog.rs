//! Read-only menu catalog.
//!
//! The [`Catalog`] trait is the seam through which the rest of the crate
//! reads menu data. [`StaticCatalog`] is the built-in implementation holding
//! the demo menu.

use crate::types::{
    Customization, CustomizationOption, ItemDetails, MenuEntry, NutritionalInfo,
};

/// Category filter value that matches every entry.
pub const ALL_CATEGORIES: &str = "All";

/// Ordered, immutable source of menu entries.
pub trait Catalog: Send + Sync {
    /// Every entry in display order.
    fn entries(&self) -> &[MenuEntry];

    /// Fixed category labels in display order.
    fn categories(&self) -> &[String];

    fn get(&self, id: &str) -> Option<&MenuEntry> {
        self.entries().iter().find(|entry| entry.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    entries: Vec<MenuEntry>,
    categories: Vec<String>,
}

impl Catalog for StaticCatalog {
    fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl StaticCatalog {
    pub fn new(entries: Vec<MenuEntry>, categories: Vec<String>) -> Self {
        Self { entries, categories }
    }

    /// Filter entries by category and free-text query.
    ///
    /// `category` of `None` or [`ALL_CATEGORIES`] matches everything. The
    /// query is matched case-insensitively against the name, the
    /// description, and each ingredient; a blank query matches everything.
    pub fn search(&self, category: Option<&str>, query: &str) -> Vec<&MenuEntry> {
        let query = query.trim().to_lowercase();

        self.entries
            .iter()
            .filter(|entry| match category {
                None => true,
                Some(c) if c == ALL_CATEGORIES => true,
                Some(c) => entry.category == c,
            })
            .filter(|entry| query.is_empty() || matches_query(entry, &query))
            .collect()
    }

    /// The seven-item demo menu.
    pub fn demo() -> Self {
        let entries = vec![
            demo_entry(
                "I101",
                "Grilled Chicken",
                "Tender grilled chicken with herbs and spices",
                250,
                "Main Course",
                "/grilled-chicken-with-herbs-and-spices-on-plate.jpg",
                &[
                    "Chicken breast",
                    "Garlic",
                    "Ginger",
                    "Yogurt",
                    "Cumin",
                    "Coriander",
                    "Turmeric",
                    "Red chili powder",
                ],
                Some(details(
                    (320, "28g", "5g", "18g"),
                    "15-20 minutes",
                    "1 portion (200g)",
                    2,
                    false,
                    &["Dairy"],
                    vec![
                        spice_levels(),
                        addons(&[("Extra Sauce", 20), ("Grilled Vegetables", 40), ("Cheese", 30)]),
                    ],
                )),
            ),
            demo_entry(
                "I102",
                "Mutton Curry",
                "Rich and flavorful mutton curry with traditional spices",
                300,
                "Main Course",
                "/rich-mutton-curry-with-traditional-spices-in-bowl.jpg",
                &[
                    "Mutton",
                    "Onions",
                    "Tomatoes",
                    "Garam masala",
                    "Bay leaves",
                    "Cardamom",
                    "Cinnamon",
                    "Coconut milk",
                ],
                Some(details(
                    (450, "32g", "12g", "28g"),
                    "25-30 minutes",
                    "1 bowl (300g)",
                    3,
                    false,
                    &[],
                    vec![spice_levels(), addons(&[("Extra Gravy", 30), ("Steamed Rice", 60)])],
                )),
            ),
            demo_entry(
                "I103",
                "Fish Fry",
                "Crispy fried fish with coastal spices",
                200,
                "Main Course",
                "/crispy-fried-fish-with-coastal-spices-golden-brown.jpg",
                &[
                    "Fish",
                    "Turmeric",
                    "Red chili powder",
                    "Coriander",
                    "Curry leaves",
                    "Coconut oil",
                ],
                Some(details(
                    (280, "24g", "8g", "16g"),
                    "15 minutes",
                    "2 pieces (250g)",
                    2,
                    false,
                    &["Fish"],
                    vec![spice_levels()],
                )),
            ),
            demo_entry(
                "I201",
                "Chicken Kebab",
                "Juicy chicken kebabs grilled to perfection",
                150,
                "Starters",
                "/juicy-grilled-chicken-kebabs-on-skewers-with-veget.jpg",
                &[
                    "Chicken",
                    "Yogurt",
                    "Ginger-garlic paste",
                    "Red chili powder",
                    "Garam masala",
                    "Lemon juice",
                ],
                Some(details(
                    (220, "22g", "4g", "12g"),
                    "12-15 minutes",
                    "6 pieces",
                    2,
                    false,
                    &["Dairy"],
                    vec![addons(&[("Mint Chutney", 10), ("Extra Onions", 10)])],
                )),
            ),
            demo_entry(
                "I202",
                "Paneer Tikka",
                "Marinated paneer cubes grilled with vegetables",
                120,
                "Starters",
                "/marinated-paneer-tikka-cubes-with-colorful-bell-pe.jpg",
                &["Paneer", "Bell peppers", "Onions", "Yogurt", "Tandoori masala", "Mint chutney"],
                Some(details(
                    (260, "14g", "9g", "18g"),
                    "10-12 minutes",
                    "8 pieces",
                    1,
                    true,
                    &["Dairy"],
                    vec![spice_levels()],
                )),
            ),
            demo_entry(
                "I301",
                "Mango Lassi",
                "Refreshing mango yogurt drink",
                80,
                "Drinks",
                "/refreshing-mango-lassi-drink-in-tall-glass-with-ga.jpg",
                &["Mango pulp", "Yogurt", "Sugar", "Cardamom", "Ice"],
                Some(details(
                    (180, "5g", "32g", "4g"),
                    "5 minutes",
                    "1 glass (300ml)",
                    0,
                    true,
                    &["Dairy"],
                    vec![sweetness()],
                )),
            ),
            demo_entry(
                "I302",
                "Fresh Lime Soda",
                "Zesty lime soda with mint",
                60,
                "Drinks",
                "/fresh-lime-soda-with-mint-leaves-in-glass-with-ice.jpg",
                &["Fresh lime juice", "Soda water", "Mint leaves", "Salt", "Sugar", "Ice"],
                Some(details(
                    (60, "0g", "15g", "0g"),
                    "3 minutes",
                    "1 glass (300ml)",
                    0,
                    true,
                    &[],
                    vec![sweetness()],
                )),
            ),
        ];

        let categories = ["Starters", "Main Course", "Drinks"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        Self::new(entries, categories)
    }
}

fn matches_query(entry: &MenuEntry, query: &str) -> bool {
    entry.name.to_lowercase().contains(query)
        || entry.description.to_lowercase().contains(query)
        || entry
            .ingredients
            .iter()
            .any(|ingredient| ingredient.to_lowercase().contains(query))
}

// ─────────────────────────────────────────────────────────
// Demo data builders
// ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn demo_entry(
    id: &str,
    name: &str,
    description: &str,
    price: u64,
    category: &str,
    image: &str,
    ingredients: &[&str],
    details: Option<ItemDetails>,
) -> MenuEntry {
    MenuEntry {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        image: Some(image.to_string()),
        ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
        details,
    }
}

fn details(
    (calories, protein, carbs, fat): (u32, &str, &str, &str),
    preparation_time: &str,
    serving_size: &str,
    spice_level: u8,
    is_vegetarian: bool,
    allergens: &[&str],
    customizations: Vec<Customization>,
) -> ItemDetails {
    ItemDetails {
        nutrition: NutritionalInfo {
            calories,
            protein: protein.to_string(),
            carbs: carbs.to_string(),
            fat: fat.to_string(),
        },
        preparation_time: preparation_time.to_string(),
        serving_size: serving_size.to_string(),
        spice_level,
        is_vegetarian,
        allergens: allergens.iter().map(|a| a.to_string()).collect(),
        customizations,
    }
}

fn customization(name: &str, options: &[(&str, u64)]) -> Customization {
    Customization {
        name: name.to_string(),
        options: options
            .iter()
            .map(|(name, price)| CustomizationOption {
                name: name.to_string(),
                price: *price,
            })
            .collect(),
    }
}

fn spice_levels() -> Customization {
    customization(
        "Spice Level",
        &[("Mild", 0), ("Medium", 0), ("Hot", 0), ("Extra Hot", 10)],
    )
}

fn addons(options: &[(&str, u64)]) -> Customization {
    customization("Add-ons", options)
}

fn sweetness() -> Customization {
    customization("Sweetness", &[("Less Sweet", 0), ("Regular", 0), ("Extra Sweet", 0)])
}
