use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::error::ExtractError;
use crate::model::{Recipe, RecipeRecord};

/// Completeness and distribution statistics over a set of extracted records.
#[derive(Debug, Serialize)]
pub struct ExtractionStats {
    pub total_records: usize,
    pub recipes_found: usize,
    /// Fraction of recipes with a usable value, per field
    pub field_completeness: BTreeMap<String, f64>,
    pub unique_values: BTreeMap<String, usize>,
    pub avg_ingredients_per_recipe: f64,
    pub avg_tags_per_recipe: f64,
}

/// Compute statistics over reconciled records.
pub fn analyze(records: &[RecipeRecord]) -> ExtractionStats {
    let recipes: Vec<&Recipe> = records.iter().filter_map(|r| r.recipe.as_ref()).collect();
    let total = recipes.len();

    let mut field_completeness = BTreeMap::new();
    let mut unique_values = BTreeMap::new();
    let mut avg_ingredients = 0.0;
    let mut avg_tags = 0.0;

    if total > 0 {
        let fraction = |count: usize| count as f64 / total as f64;
        let completeness: [(&str, usize); 9] = [
            (
                "has_title",
                recipes
                    .iter()
                    .filter(|r| !r.title.is_empty() && r.title != "unknown")
                    .count(),
            ),
            (
                "has_ingredients",
                recipes.iter().filter(|r| !r.ingredients.is_empty()).count(),
            ),
            (
                "has_instructions",
                recipes.iter().filter(|r| !r.instructions.is_empty()).count(),
            ),
            (
                "has_proteins",
                recipes.iter().filter(|r| !r.proteins.is_empty()).count(),
            ),
            (
                "has_vegetables",
                recipes.iter().filter(|r| !r.vegetables.is_empty()).count(),
            ),
            (
                "has_cooking_methods",
                recipes
                    .iter()
                    .filter(|r| !r.cooking_methods.is_empty())
                    .count(),
            ),
            (
                "has_dietary_tags",
                recipes.iter().filter(|r| !r.dietary_tags.is_empty()).count(),
            ),
            (
                "has_occasion",
                recipes.iter().filter(|r| !r.occasion.is_empty()).count(),
            ),
            (
                "has_season",
                recipes
                    .iter()
                    .filter(|r| !r.season.is_empty() && !r.season.iter().any(|s| s == "unknown"))
                    .count(),
            ),
        ];
        for (name, count) in completeness {
            field_completeness.insert(name.to_string(), fraction(count));
        }

        unique_values.insert(
            "cuisines".to_string(),
            recipes
                .iter()
                .map(|r| r.cuisine_type.as_str())
                .collect::<HashSet<_>>()
                .len(),
        );
        unique_values.insert(
            "cooking_methods".to_string(),
            recipes
                .iter()
                .flat_map(|r| r.cooking_methods.iter())
                .collect::<HashSet<_>>()
                .len(),
        );
        unique_values.insert(
            "proteins".to_string(),
            recipes
                .iter()
                .flat_map(|r| r.proteins.iter())
                .collect::<HashSet<_>>()
                .len(),
        );
        unique_values.insert(
            "vegetables".to_string(),
            recipes
                .iter()
                .flat_map(|r| r.vegetables.iter())
                .collect::<HashSet<_>>()
                .len(),
        );

        avg_ingredients =
            recipes.iter().map(|r| r.ingredients.len()).sum::<usize>() as f64 / total as f64;
        avg_tags = recipes
            .iter()
            .map(|r| r.dietary_tags.len() + r.style_tags.len() + r.occasion.len())
            .sum::<usize>() as f64
            / total as f64;
    }

    ExtractionStats {
        total_records: records.len(),
        recipes_found: total,
        field_completeness,
        unique_values,
        avg_ingredients_per_recipe: avg_ingredients,
        avg_tags_per_recipe: avg_tags,
    }
}

#[derive(Serialize)]
struct ExtractionMetadata<'a> {
    model: &'a str,
    extraction_timestamp: chrono::DateTime<Utc>,
    total_records: usize,
    analysis: ExtractionStats,
}

#[derive(Serialize)]
struct Artifact<'a> {
    extraction_metadata: ExtractionMetadata<'a>,
    records: &'a [RecipeRecord],
}

/// Serialize records with analysis metadata to a single JSON artifact.
pub fn save_analysis(
    records: &[RecipeRecord],
    model: &str,
    path: &Path,
) -> Result<(), ExtractError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let analysis = analyze(records);
    let artifact = Artifact {
        extraction_metadata: ExtractionMetadata {
            model,
            extraction_timestamp: Utc::now(),
            total_records: records.len(),
            analysis,
        },
        records,
    };

    fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
    info!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, ingredients: Vec<&str>, cuisine: &str) -> RecipeRecord {
        RecipeRecord {
            post_pk: "1".to_string(),
            code: "c1".to_string(),
            caption: "caption".to_string(),
            is_recipe: true,
            confidence: 0.9,
            recipe: Some(Recipe {
                title: title.to_string(),
                ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
                instructions: vec!["Mix".to_string()],
                cuisine_type: cuisine.to_string(),
                difficulty: "easy".to_string(),
                meal_type: "dinner".to_string(),
                proteins: vec!["eggs".to_string()],
                vegetables: vec![],
                grains_starches: vec![],
                herbs_spices: vec![],
                cooking_methods: vec!["baking".to_string()],
                equipment: vec![],
                prep_time: "unknown".to_string(),
                cook_time: "unknown".to_string(),
                total_time: "unknown".to_string(),
                servings: "unknown".to_string(),
                temperature: "hot".to_string(),
                texture: vec![],
                flavor_profile: vec![],
                dietary_tags: vec!["vegetarian".to_string()],
                health_tags: vec![],
                season: vec![],
                occasion: vec![],
                skill_level: "beginner".to_string(),
                style_tags: vec![],
                prep_style: vec![],
            }),
        }
    }

    #[test]
    fn test_analyze_counts_unique_values() {
        let records = vec![
            record("Cake", vec!["flour", "eggs"], "italian"),
            record("Pie", vec!["apples"], "american"),
            record("Tart", vec!["pears"], "italian"),
        ];

        let stats = analyze(&records);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.recipes_found, 3);
        assert_eq!(stats.unique_values["cuisines"], 2);
        assert!((stats.avg_ingredients_per_recipe - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_title_does_not_count_as_complete() {
        let records = vec![
            record("Cake", vec!["flour"], "italian"),
            record("unknown", vec![], "other"),
        ];

        let stats = analyze(&records);
        assert!((stats.field_completeness["has_title"] - 0.5).abs() < 1e-9);
        assert!((stats.field_completeness["has_ingredients"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_records_produce_empty_stats() {
        let stats = analyze(&[]);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.recipes_found, 0);
        assert!(stats.field_completeness.is_empty());
        assert_eq!(stats.avg_ingredients_per_recipe, 0.0);
    }

    #[test]
    fn test_unknown_season_does_not_count_as_complete() {
        let mut tagged = record("Cake", vec!["flour"], "italian");
        tagged.recipe.as_mut().unwrap().season = vec!["summer".to_string()];
        let mut untagged = record("Pie", vec!["apples"], "american");
        untagged.recipe.as_mut().unwrap().season = vec!["unknown".to_string()];

        let stats = analyze(&[tagged, untagged]);
        assert!((stats.field_completeness["has_season"] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_save_analysis_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/out/analyzed_recipes.json");
        let records = vec![record("Cake", vec!["flour"], "italian")];

        save_analysis(&records, "gpt-4.1", &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_analysis_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analyzed_recipes.json");
        let records = vec![record("Cake", vec!["flour"], "italian")];

        save_analysis(&records, "gpt-4.1", &path).unwrap();

        let artifact: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(artifact["extraction_metadata"]["model"], "gpt-4.1");
        assert_eq!(artifact["extraction_metadata"]["total_records"], 1);
        assert_eq!(artifact["records"][0]["title"], "Cake");
    }
}
