//! Naming resolver: source key and bucket in, resize plan out.
//!
//! Source keys follow the `{record id}-orig.{extension}` convention, e.g.
//! `alice-picture-orig.png`. The key selects a category (which variant sizes
//! to produce), the bucket selects the metadata table. Both mappings are
//! plain ordered rule tables so they can be swapped and tested in isolation.

use percent_encoding::percent_decode_str;

use crate::error::ResolveError;
use crate::models::{ResizePlan, SourceDescriptor, VariantSpec};

/// Key keyword → ordered list of variants to produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub keyword: String,
    pub variants: Vec<VariantSpec>,
}

/// Bucket keyword → metadata table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRule {
    pub keyword: String,
    pub table: String,
    /// Store the decoded source key on the record
    pub include_filename: bool,
}

/// Bucket marker that prefixes the table name for non-production deployments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRule {
    pub marker: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    pub categories: Vec<CategoryRule>,
    pub tables: Vec<TableRule>,
    pub environment: Option<EnvironmentRule>,
    pub destination_suffix: String,
    /// Marks the end of the record id in a source key
    pub record_marker: String,
    /// Token inside the marker that is swapped for the variant's key suffix
    pub placeholder: String,
    pub allowed_extensions: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let table = |keyword: &str, table: &str| TableRule {
            keyword: keyword.to_string(),
            table: table.to_string(),
            include_filename: false,
        };

        Self {
            categories: vec![
                CategoryRule {
                    keyword: "picture".to_string(),
                    variants: vec![
                        VariantSpec::square("thumb", 200),
                        VariantSpec::square("full", 640),
                    ],
                },
                CategoryRule {
                    keyword: "cover".to_string(),
                    variants: vec![VariantSpec::square("full", 1280)],
                },
            ],
            tables: vec![
                table("user-images", "UserImages"),
                table("post-images", "PostImages"),
                table("branch-images", "BranchImages"),
            ],
            environment: Some(EnvironmentRule {
                marker: "dev".to_string(),
                prefix: "dev".to_string(),
            }),
            destination_suffix: "-resized".to_string(),
            record_marker: "-orig".to_string(),
            placeholder: "orig".to_string(),
            allowed_extensions: ["jpg", "jpe", "jpeg", "png", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.categories.is_empty() {
            return Err(ResolveError::InvalidConfig(
                "at least one category rule is required".to_string(),
            ));
        }

        for rule in &self.categories {
            if rule.keyword.is_empty() {
                return Err(ResolveError::InvalidConfig(
                    "category keyword must not be empty".to_string(),
                ));
            }
            if rule.variants.is_empty() {
                return Err(ResolveError::InvalidConfig(format!(
                    "category {} has no variants",
                    rule.keyword
                )));
            }
            if let Some(v) = rule
                .variants
                .iter()
                .find(|v| v.max_width == 0 || v.max_height == 0)
            {
                return Err(ResolveError::InvalidConfig(format!(
                    "variant {} of category {} has a zero bound",
                    v.label, rule.keyword
                )));
            }
        }

        if self.record_marker.is_empty() || !self.record_marker.contains(&self.placeholder) {
            return Err(ResolveError::InvalidConfig(format!(
                "record marker {:?} must contain placeholder {:?}",
                self.record_marker, self.placeholder
            )));
        }

        Ok(())
    }
}

/// Decode an object key as delivered in storage notifications.
///
/// Keys are percent-encoded and use `+` for spaces, so every `+` left after
/// percent-decoding is read as a space. Escapes that do not form valid
/// UTF-8 are rejected rather than replaced.
pub fn decode_object_key(encoded: &str) -> Result<String, ResolveError> {
    let binding = encoded.replace('+', " ");
    let decoded = percent_decode_str(&binding)
        .decode_utf8()
        .map_err(|_| ResolveError::InvalidKeyEncoding(encoded.to_string()))?;
    Ok(decoded.replace('+', " "))
}

#[derive(Debug, Clone)]
pub struct NamingResolver {
    config: NamingConfig,
}

impl Default for NamingResolver {
    fn default() -> Self {
        Self {
            config: NamingConfig::default(),
        }
    }
}

impl NamingResolver {
    pub fn new(config: NamingConfig) -> Result<Self, ResolveError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    /// Resolve a source object into a resize plan. Performs no I/O.
    pub fn resolve(&self, source: &SourceDescriptor) -> Result<ResizePlan, ResolveError> {
        let key = decode_object_key(&source.encoded_key)?;

        let category = self
            .config
            .categories
            .iter()
            .find(|rule| key.contains(rule.keyword.as_str()))
            .ok_or_else(|| ResolveError::InvalidCategory(key.clone()))?;

        let destination_bucket = format!("{}{}", source.bucket, self.config.destination_suffix);
        if destination_bucket == source.bucket {
            return Err(ResolveError::SameBucket(source.bucket.clone()));
        }

        let table_rule = self.table_rule(&source.bucket);
        let target_table = table_rule.map(|rule| self.environment_table(&source.bucket, &rule.table));

        let extension = extension_of(&key)?;
        if !self
            .config
            .allowed_extensions
            .iter()
            .any(|allowed| *allowed == extension)
        {
            return Err(ResolveError::UnsupportedType(extension));
        }

        let marker = self.config.record_marker.as_str();
        let marker_at = key
            .find(marker)
            .filter(|&at| at > 0)
            .ok_or_else(|| ResolveError::MissingRecordMarker {
                key: key.clone(),
                marker: marker.to_string(),
            })?;
        let record_id = key[..marker_at].to_string();
        let remainder = &key[marker_at + marker.len()..];

        let destination_keys = category
            .variants
            .iter()
            .map(|variant| {
                let sized_marker = marker.replacen(&self.config.placeholder, &variant.key_suffix, 1);
                format!("{}{}{}", record_id, sized_marker, remainder)
            })
            .collect();

        Ok(ResizePlan {
            source_bucket: source.bucket.clone(),
            source_key: key,
            destination_bucket,
            destination_keys,
            variants: category.variants.clone(),
            target_table,
            record_id,
            extension,
            include_filename: table_rule.is_some_and(|rule| rule.include_filename),
        })
    }

    fn table_rule(&self, bucket: &str) -> Option<&TableRule> {
        self.config
            .tables
            .iter()
            .find(|rule| bucket.contains(rule.keyword.as_str()))
    }

    fn environment_table(&self, bucket: &str, table: &str) -> String {
        match &self.config.environment {
            Some(env) if bucket.contains(env.marker.as_str()) => format!("{}{}", env.prefix, table),
            _ => table.to_string(),
        }
    }
}

/// Lowercased suffix after the last `.` of a key
fn extension_of(key: &str) -> Result<String, ResolveError> {
    key.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| ResolveError::NoExtension(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(bucket: &str, key: &str) -> Result<ResizePlan, ResolveError> {
        NamingResolver::default().resolve(&SourceDescriptor::new(bucket, key))
    }

    #[test]
    fn test_picture_resolves_two_variants_in_order() {
        let plan = resolve("user-images", "alice-picture-orig.png").unwrap();
        assert_eq!(
            plan.destination_keys,
            vec!["alice-picture-200.png", "alice-picture-640.png"]
        );
        let labels: Vec<_> = plan.variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["thumb", "full"]);
        assert_eq!(plan.destination_bucket, "user-images-resized");
        assert_eq!(plan.record_id, "alice-picture");
        assert_eq!(plan.extension, "png");
        assert_eq!(plan.target_table.as_deref(), Some("UserImages"));
    }

    #[test]
    fn test_cover_resolves_single_variant() {
        let plan = resolve("branch-images", "shop-cover-orig.JPG").unwrap();
        assert_eq!(plan.destination_keys, vec!["shop-cover-1280.JPG"]);
        assert_eq!(plan.variants[0].max_width, 1280);
        assert_eq!(plan.extension, "jpg");
        assert_eq!(plan.target_table.as_deref(), Some("BranchImages"));
    }

    #[test]
    fn test_placeholder_inside_record_id_is_untouched() {
        let plan = resolve("user-images", "george-picture-orig.png").unwrap();
        assert_eq!(plan.record_id, "george-picture");
        assert_eq!(plan.destination_keys[0], "george-picture-200.png");
    }

    #[test]
    fn test_first_category_wins() {
        let plan = resolve("user-images", "x-picture-cover-orig.png").unwrap();
        assert_eq!(plan.variants.len(), 2);
    }

    #[test]
    fn test_category_match_is_case_sensitive() {
        let err = resolve("user-images", "alice-PICTURE-orig.png").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCategory(_)));
    }

    #[test]
    fn test_unmatched_category() {
        let err = resolve("user-images", "alice-avatar-orig.png").unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidCategory("alice-avatar-orig.png".to_string())
        );
    }

    #[test]
    fn test_plus_and_encoded_plus_decode_to_space() {
        assert_eq!(
            decode_object_key("user%2Bname-picture-orig.jpg").unwrap(),
            "user name-picture-orig.jpg"
        );
        assert_eq!(
            decode_object_key("user+name-picture-orig.jpg").unwrap(),
            "user name-picture-orig.jpg"
        );
    }

    #[test]
    fn test_unicode_key_decodes() {
        assert_eq!(
            decode_object_key("ren%C3%A9e-picture-orig.png").unwrap(),
            "renée-picture-orig.png"
        );
        let plan = resolve("user-images", "ren%C3%A9e+b-picture-orig.png").unwrap();
        assert_eq!(plan.source_key, "renée b-picture-orig.png");
        assert_eq!(plan.destination_keys[0], "renée b-picture-200.png");
    }

    #[test]
    fn test_invalid_utf8_escape_is_rejected() {
        assert_eq!(
            decode_object_key("a%FF-picture-orig.png"),
            Err(ResolveError::InvalidKeyEncoding("a%FF-picture-orig.png".to_string()))
        );
        let err = resolve("user-images", "a%FF-picture-orig.png").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidKeyEncoding(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = resolve("user-images", "alice-picture-orig.gif").unwrap_err();
        assert_eq!(err, ResolveError::UnsupportedType("gif".to_string()));
    }

    #[test]
    fn test_all_allowed_extensions_pass_in_any_case() {
        for ext in ["jpg", "JPE", "Jpeg", "png", "BMP"] {
            let key = format!("a-picture-orig.{}", ext);
            let plan = resolve("user-images", &key).unwrap();
            assert_eq!(plan.extension, ext.to_lowercase());
        }
    }

    #[test]
    fn test_missing_extension() {
        let err = resolve("user-images", "alice-picture-orig").unwrap_err();
        assert!(matches!(err, ResolveError::NoExtension(_)));
    }

    #[test]
    fn test_missing_marker_is_rejected() {
        let err = resolve("user-images", "alice-picture.png").unwrap_err();
        assert!(matches!(err, ResolveError::MissingRecordMarker { .. }));
    }

    #[test]
    fn test_empty_record_id_is_rejected() {
        let config = NamingConfig {
            categories: vec![CategoryRule {
                keyword: "orig".to_string(),
                variants: vec![VariantSpec::square("thumb", 10)],
            }],
            ..NamingConfig::default()
        };
        let resolver = NamingResolver::new(config).unwrap();
        let err = resolver
            .resolve(&SourceDescriptor::new("user-images", "-orig.png"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingRecordMarker { .. }));
    }

    #[test]
    fn test_same_bucket_is_rejected() {
        let config = NamingConfig {
            destination_suffix: String::new(),
            ..NamingConfig::default()
        };
        let resolver = NamingResolver::new(config).unwrap();
        let err = resolver
            .resolve(&SourceDescriptor::new("user-images", "alice-picture-orig.png"))
            .unwrap_err();
        assert_eq!(err, ResolveError::SameBucket("user-images".to_string()));
    }

    #[test]
    fn test_dev_bucket_prefixes_table() {
        let plan = resolve("dev-user-images", "alice-picture-orig.png").unwrap();
        assert_eq!(plan.target_table.as_deref(), Some("devUserImages"));

        let plan = resolve("post-images-dev", "p1-cover-orig.jpeg").unwrap();
        assert_eq!(plan.target_table.as_deref(), Some("devPostImages"));
    }

    #[test]
    fn test_unmatched_bucket_has_no_table() {
        let plan = resolve("dev-misc-bucket", "alice-picture-orig.png").unwrap();
        assert_eq!(plan.target_table, None);
    }

    #[test]
    fn test_include_filename_follows_table_rule() {
        let mut config = NamingConfig::default();
        config.tables[0].include_filename = true;
        let resolver = NamingResolver::new(config).unwrap();

        let plan = resolver
            .resolve(&SourceDescriptor::new("user-images", "a-picture-orig.png"))
            .unwrap();
        assert!(plan.include_filename);

        let plan = resolver
            .resolve(&SourceDescriptor::new("post-images", "a-picture-orig.png"))
            .unwrap();
        assert!(!plan.include_filename);
    }

    #[test]
    fn test_arbitrary_variant_count() {
        let config = NamingConfig {
            categories: vec![CategoryRule {
                keyword: "gallery".to_string(),
                variants: vec![
                    VariantSpec::square("xs", 64),
                    VariantSpec::square("s", 128),
                    VariantSpec::new("wide", 1920, 1080, "1080p"),
                ],
            }],
            ..NamingConfig::default()
        };
        let resolver = NamingResolver::new(config).unwrap();
        let plan = resolver
            .resolve(&SourceDescriptor::new("user-images", "g-gallery-orig.png"))
            .unwrap();
        assert_eq!(
            plan.destination_keys,
            vec![
                "g-gallery-64.png",
                "g-gallery-128.png",
                "g-gallery-1080p.png"
            ]
        );
    }

    #[test]
    fn test_config_validation() {
        let empty = NamingConfig {
            categories: vec![],
            ..NamingConfig::default()
        };
        assert!(NamingResolver::new(empty).is_err());

        let zero = NamingConfig {
            categories: vec![CategoryRule {
                keyword: "picture".to_string(),
                variants: vec![VariantSpec::new("bad", 0, 100, "0")],
            }],
            ..NamingConfig::default()
        };
        assert!(matches!(
            NamingResolver::new(zero),
            Err(ResolveError::InvalidConfig(_))
        ));

        let no_variants = NamingConfig {
            categories: vec![CategoryRule {
                keyword: "picture".to_string(),
                variants: vec![],
            }],
            ..NamingConfig::default()
        };
        assert!(NamingResolver::new(no_variants).is_err());

        assert!(NamingConfig::default().validate().is_ok());
    }
}
