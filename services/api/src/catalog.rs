//! services/api/src/catalog.rs
//!
//! Reference data behind the stub analysis: known conditions, their remedies,
//! and the product catalog, plus the rules that personalize them to an intake.

use dermascan_core::domain::{AnalysisReport, Product, UserDetails};
use rand::seq::SliceRandom;
use rand::Rng;

/// Maximum number of products recommended per analysis.
pub const RECOMMENDATION_COUNT: usize = 3;

const GENERIC_REMEDY: &str = "Consult with a dermatologist for personalized remedies";
const UNKNOWN_DESCRIPTION: &str = "Information not available";

const CLEANSER_IMAGE: &str = "/lovable-uploads/67470ab7-bf23-42ad-9043-88dbbd73f5d5.png";
const CREAM_IMAGE: &str = "/lovable-uploads/daa6cfca-3cff-4f73-bc3e-16ffa8cfabfd.png";

pub struct Condition {
    pub name: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub symptoms: &'static [&'static str],
    pub remedies: &'static [&'static str],
}

pub static CONDITIONS: [Condition; 5] = [
    Condition {
        name: "Psoriasis",
        summary: "Autoimmune condition affecting the skin",
        description: "Psoriasis is a skin disorder that causes skin cells to multiply up to 10 times faster than normal.",
        symptoms: &["Red patches with silvery scales", "Small scaling spots", "Dry, cracked skin"],
        remedies: &[
            "Apply moisturizing creams regularly",
            "Take daily baths with gentle cleansers",
            "Avoid dry air and cold weather",
            "Use a humidifier",
            "Expose your skin to small amounts of sunlight",
        ],
    },
    Condition {
        name: "Ringworm",
        summary: "Fungal infection affecting skin, hair, nails",
        description: "Ringworm is a common fungal infection that affects the skin, hair and nails.",
        symptoms: &["Red, scaly, itchy patch", "Ring-shaped rash", "Blisters and pustules"],
        remedies: &[
            "Keep affected areas clean and dry",
            "Apply antifungal cream as directed",
            "Don't share personal items",
            "Change socks and underwear daily",
            "Treat pets if they are the source",
        ],
    },
    Condition {
        name: "Shingles",
        summary: "Viral infection causing painful rash",
        description: "Shingles is a viral infection that causes a painful rash.",
        symptoms: &["Pain, burning, numbness", "Sensitivity to touch", "Red rash"],
        remedies: &[
            "Apply cool compresses to reduce pain",
            "Take regular baths or use calamine lotion",
            "Wear loose-fitting clothing",
            "Reduce stress to prevent outbreaks",
            "Get plenty of rest and maintain a healthy diet",
        ],
    },
    Condition {
        name: "Vitiligo",
        summary: "Causes loss of skin color in patches",
        description: "Vitiligo is a disease that causes the loss of skin color in blotches.",
        symptoms: &["Patchy loss of skin color", "Premature whitening of hair", "Loss of color in mouth"],
        remedies: &[
            "Use sunscreen with high SPF",
            "Protect skin from the sun",
            "Consider makeup or self-tanning products",
            "Join a support group for emotional support",
            "Maintain overall health with a balanced diet",
        ],
    },
    Condition {
        name: "Eczema",
        summary: "Causes inflamed, itchy, rough skin",
        description: "Eczema is a condition where patches of skin become inflamed, itchy, red, cracked, and rough.",
        symptoms: &["Dry, sensitive skin", "Itching", "Inflamed, discolored skin"],
        remedies: &[
            "Apply moisturizer frequently",
            "Use gentle, fragrance-free products",
            "Take lukewarm (not hot) baths",
            "Use a humidifier",
            "Try to identify and avoid triggers",
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeRange {
    All,
    Adult,
}

pub struct CatalogProduct {
    pub name: &'static str,
    pub image_url: &'static str,
    pub description: &'static str,
    pub conditions: &'static [&'static str],
    pub ingredients: &'static str,
    pub skin_types: &'static str,
    pub age_range: AgeRange,
}

impl CatalogProduct {
    fn to_product(&self) -> Product {
        Product {
            name: self.name.to_string(),
            image_url: self.image_url.to_string(),
            description: Some(self.description.to_string()),
        }
    }

    fn treats(&self, disease: &str) -> bool {
        self.conditions.iter().any(|condition| *condition == disease)
    }

    fn suits_skin(&self, skin_type: &str) -> bool {
        self.skin_types == "all" || self.skin_types.contains(skin_type)
    }

    fn contains_allergen(&self, allergen: &str) -> bool {
        self.ingredients.to_lowercase().contains(allergen)
    }
}

macro_rules! product {
    ($name:expr, $image:expr, $description:expr, [$($condition:expr),+], $ingredients:expr, $skin:expr, $age:expr) => {
        CatalogProduct {
            name: $name,
            image_url: $image,
            description: $description,
            conditions: &[$($condition),+],
            ingredients: $ingredients,
            skin_types: $skin,
            age_range: $age,
        }
    };
}

pub static PRODUCTS: [CatalogProduct; 18] = [
    product!("Hydrating Cleanser", CLEANSER_IMAGE, "Gentle, non-foaming cleanser for sensitive skin", ["Eczema"], "water, glycerin, ceramides, hyaluronic acid", "dry, sensitive", AgeRange::All),
    product!("Barrier Repair Cream", CREAM_IMAGE, "Restores the skin's protective barrier", ["Eczema"], "shea butter, ceramides, fatty acids, cholesterol", "dry, sensitive, normal", AgeRange::All),
    product!("Colloidal Oatmeal Bath", CLEANSER_IMAGE, "Soothes itchy, irritated skin", ["Eczema"], "colloidal oatmeal, natural oils", "all", AgeRange::All),
    product!("Coal Tar Shampoo", CLEANSER_IMAGE, "Reduces scaling, itching and inflammation", ["Psoriasis"], "coal tar, salicylic acid", "all", AgeRange::Adult),
    product!("Salicylic Acid Ointment", CREAM_IMAGE, "Helps remove scales and smooth skin", ["Psoriasis"], "salicylic acid, mineral oil", "all", AgeRange::Adult),
    product!("Corticosteroid Cream", CLEANSER_IMAGE, "Reduces inflammation and relieves itching", ["Psoriasis", "Eczema"], "hydrocortisone, petroleum jelly", "all", AgeRange::Adult),
    product!("Antifungal Cream", CLEANSER_IMAGE, "Combats fungal infections", ["Ringworm"], "clotrimazole, miconazole", "all", AgeRange::All),
    product!("Medicated Soap", CREAM_IMAGE, "Helps cleanse infected areas", ["Ringworm"], "ketoconazole, tea tree oil", "all", AgeRange::All),
    product!("Antifungal Powder", CLEANSER_IMAGE, "Helps keep affected areas dry", ["Ringworm"], "miconazole, zinc oxide", "all", AgeRange::All),
    product!("Antiviral Medication", CLEANSER_IMAGE, "Prescription medication to combat the virus", ["Shingles"], "acyclovir, famciclovir", "all", AgeRange::Adult),
    product!("Calamine Lotion", CREAM_IMAGE, "Soothes skin and reduces itching", ["Shingles"], "calamine, zinc oxide", "all", AgeRange::All),
    product!("Lidocaine Patch", CLEANSER_IMAGE, "Provides pain relief", ["Shingles"], "lidocaine", "all", AgeRange::Adult),
    product!("Topical Corticosteroids", CLEANSER_IMAGE, "May help return color to the skin", ["Vitiligo"], "betamethasone, clobetasol", "all", AgeRange::Adult),
    product!("UVB Phototherapy Device", CREAM_IMAGE, "Light therapy that may restore skin color", ["Vitiligo"], "UVB light", "all", AgeRange::Adult),
    product!("Specialized Concealer", CLEANSER_IMAGE, "Helps cover depigmented areas", ["Vitiligo"], "iron oxides, titanium dioxide", "all", AgeRange::All),
    product!("Hypoallergenic Moisturizer", CLEANSER_IMAGE, "Extra gentle formula for sensitive skin", ["Eczema", "Psoriasis", "Vitiligo"], "glycerin, squalane, no fragrance", "sensitive, dry", AgeRange::All),
    product!("Soothing Aloe Gel", CREAM_IMAGE, "Naturally calms irritated skin", ["Eczema", "Psoriasis", "Shingles"], "aloe vera, cucumber extract", "all", AgeRange::All),
    product!("Gentle Sunscreen SPF 50", CLEANSER_IMAGE, "Broad-spectrum protection for sensitive skin", ["Vitiligo", "Psoriasis", "Eczema"], "zinc oxide, titanium dioxide", "all", AgeRange::All),
];

//=========================================================================================
// Lookups and Recommendation Rules
//=========================================================================================

pub fn condition(name: &str) -> Option<&'static Condition> {
    CONDITIONS.iter().find(|condition| condition.name == name)
}

pub fn description_of(disease: &str) -> String {
    condition(disease)
        .map(|c| c.description)
        .unwrap_or(UNKNOWN_DESCRIPTION)
        .to_string()
}

pub fn symptoms_of(disease: &str) -> Vec<String> {
    condition(disease)
        .map(|c| c.symptoms.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

/// Base remedies for the condition followed by tips derived from the intake.
pub fn personalize_remedies(disease: &str, details: &UserDetails) -> Vec<String> {
    let mut remedies: Vec<String> = match condition(disease) {
        Some(c) => c.remedies.iter().map(|r| r.to_string()).collect(),
        None => vec![GENERIC_REMEDY.to_string()],
    };

    match details.skin_type.to_lowercase().as_str() {
        "dry" => remedies.push("Use oil-based moisturizers for extra hydration".to_string()),
        "oily" => remedies.push("Use lightweight, oil-free moisturizers".to_string()),
        "sensitive" => remedies
            .push("Patch test new products before applying them to affected areas".to_string()),
        _ => {}
    }

    match details.age {
        Some(age) if age < 18 => remedies.push("Consult with a pediatric dermatologist".to_string()),
        Some(age) if age > 60 => {
            remedies.push("Use gentle products designed for mature skin".to_string())
        }
        _ => {}
    }

    if !details.allergies.is_empty() {
        remedies.push(format!(
            "Avoid products containing your allergens: {}",
            details.allergies.join(", ")
        ));
    }

    remedies
}

/// Narrows the condition's products by skin type, age and allergens, each step
/// applied only when it leaves at least one product, then samples up to `limit`.
pub fn recommend_products<R: Rng + ?Sized>(
    disease: &str,
    details: &UserDetails,
    limit: usize,
    rng: &mut R,
) -> Vec<Product> {
    let mut candidates: Vec<&CatalogProduct> =
        PRODUCTS.iter().filter(|p| p.treats(disease)).collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let skin_type = details.skin_type.to_lowercase();
    if !skin_type.is_empty() {
        narrow(&mut candidates, |p| p.suits_skin(&skin_type));
    }

    if matches!(details.age, Some(age) if age < 18) {
        narrow(&mut candidates, |p| p.age_range == AgeRange::All);
    }

    let allergens: Vec<String> = details.allergies.iter().map(|a| a.to_lowercase()).collect();
    if !allergens.is_empty() {
        narrow(&mut candidates, |p| {
            !allergens.iter().any(|allergen| p.contains_allergen(allergen))
        });
    }

    if candidates.len() > limit {
        candidates = candidates.choose_multiple(rng, limit).copied().collect();
    }
    candidates.into_iter().map(CatalogProduct::to_product).collect()
}

fn narrow<F>(candidates: &mut Vec<&'static CatalogProduct>, keep: F)
where
    F: Fn(&CatalogProduct) -> bool,
{
    let narrowed: Vec<&'static CatalogProduct> =
        candidates.iter().copied().filter(|p| keep(p)).collect();
    if !narrowed.is_empty() {
        *candidates = narrowed;
    }
}

/// A randomly chosen condition and a confidence in `[0.70, 0.99]`, rounded to
/// two decimals. Stands in for a trained model.
pub fn predict<R: Rng + ?Sized>(rng: &mut R) -> (&'static Condition, f64) {
    let index = rng.gen_range(0..CONDITIONS.len());
    let confidence = (rng.gen_range(0.70..=0.99_f64) * 100.0).round() / 100.0;
    (&CONDITIONS[index], confidence)
}

/// A complete stub diagnosis for one intake.
pub fn report<R: Rng + ?Sized>(details: &UserDetails, rng: &mut R) -> AnalysisReport {
    let (condition, confidence) = predict(rng);
    AnalysisReport {
        disease: condition.name.to_string(),
        description: condition.description.to_string(),
        remedies: personalize_remedies(condition.name, details),
        products: recommend_products(condition.name, details, RECOMMENDATION_COUNT, rng),
        symptoms: symptoms_of(condition.name),
        confidence: Some(confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn details(skin_type: &str, age: Option<u32>, allergies: &[&str]) -> UserDetails {
        UserDetails {
            name: "Ana".to_string(),
            age,
            gender: String::new(),
            skin_type: skin_type.to_string(),
            allergies: allergies.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn unknown_condition_gets_generic_information() {
        assert_eq!(description_of("Acne"), UNKNOWN_DESCRIPTION);
        assert!(symptoms_of("Acne").is_empty());
        assert_eq!(
            personalize_remedies("Acne", &details("", None, &[])),
            vec![GENERIC_REMEDY.to_string()]
        );
    }

    #[test]
    fn remedies_are_personalized() {
        let remedies = personalize_remedies("Eczema", &details("Dry", Some(12), &["nuts", "dairy"]));
        assert_eq!(remedies.len(), 5 + 3);
        assert!(remedies.contains(&"Use oil-based moisturizers for extra hydration".to_string()));
        assert!(remedies.contains(&"Consult with a pediatric dermatologist".to_string()));
        assert_eq!(
            remedies.last().unwrap(),
            "Avoid products containing your allergens: nuts, dairy"
        );

        let senior = personalize_remedies("Vitiligo", &details("normal", Some(70), &[]));
        assert_eq!(senior.last().unwrap(), "Use gentle products designed for mature skin");
    }

    #[test]
    fn allergens_exclude_products_by_ingredient() {
        let mut rng = StdRng::seed_from_u64(7);
        let products = recommend_products("Ringworm", &details("", None, &["Zinc"]), 3, &mut rng);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Antifungal Cream", "Medicated Soap"]);
    }

    #[test]
    fn minors_only_get_products_for_all_ages() {
        let mut rng = StdRng::seed_from_u64(7);
        let products = recommend_products("Shingles", &details("", Some(15), &[]), 3, &mut rng);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Calamine Lotion", "Soothing Aloe Gel"]);
    }

    #[test]
    fn filters_that_would_empty_the_list_are_skipped() {
        let mut rng = StdRng::seed_from_u64(7);
        let everything = details("", None, &["lidocaine", "acyclovir", "calamine", "aloe"]);
        let products = recommend_products("Shingles", &everything, 3, &mut rng);
        assert_eq!(products.len(), 3);
    }

    #[test]
    fn recommendations_are_capped() {
        let mut rng = StdRng::seed_from_u64(42);
        let products = recommend_products("Eczema", &details("", None, &[]), 3, &mut rng);
        assert_eq!(products.len(), 3);
        assert!(products
            .iter()
            .all(|p| PRODUCTS.iter().any(|c| c.name == p.name && c.treats("Eczema"))));
        assert!(recommend_products("Acne", &details("", None, &[]), 3, &mut rng).is_empty());
    }

    #[test]
    fn prediction_is_a_known_condition_with_bounded_confidence() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let (condition, confidence) = predict(&mut rng);
            assert!(CONDITIONS.iter().any(|c| c.name == condition.name));
            assert!((0.70..=0.99).contains(&confidence));
        }
    }
}
