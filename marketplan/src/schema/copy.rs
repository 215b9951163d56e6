//! Marketing copy generation shapes.

use serde::{Deserialize, Serialize};

use super::validation::{Rules, Validate, ValidationError};

/// Minimum description length; shorter descriptions give the model nothing to work with.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Product details used to write ad, landing page and email copy.
///
/// Missing fields deserialize as empty so validation can name all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CopyRequest {
    pub product_name: String,
    pub product_description: String,
    pub target_audience: String,
}

impl Validate for CopyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Rules::new("copy request")
            .required("productName", &self.product_name)
            .min_length(
                "productDescription",
                &self.product_description,
                MIN_DESCRIPTION_CHARS,
            )
            .required("targetAudience", &self.target_audience)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookAd {
    pub headline: String,
    pub body: String,
}

/// Google Ads copy; headlines and descriptions keep the model's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAds {
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    pub hero_title: String,
    pub hero_subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailCopy {
    pub subject: String,
    pub body: String,
}

/// One bundle of copy per channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResponse {
    pub facebook_ad: FacebookAd,
    pub google_ads: GoogleAds,
    pub landing_page: LandingPage,
    pub email: EmailCopy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validation::Constraint;

    fn widget() -> CopyRequest {
        CopyRequest {
            product_name: "Widget".to_string(),
            product_description: "A useful widget for home organization".to_string(),
            target_audience: "busy parents".to_string(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(widget().validate().is_ok());
    }

    #[test]
    fn short_description_names_the_field() {
        let request = CopyRequest {
            product_description: "Useful".to_string(),
            ..widget()
        };
        let err = request.validate().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "productDescription");
        assert_eq!(
            err.violations[0].constraint,
            Constraint::MinLength(MIN_DESCRIPTION_CHARS)
        );
    }

    #[test]
    fn empty_name_and_audience_are_both_reported() {
        let request = CopyRequest {
            product_name: String::new(),
            target_audience: " ".to_string(),
            ..widget()
        };
        let err = request.validate().unwrap_err();
        assert!(err.has_field("productName"));
        assert!(err.has_field("targetAudience"));
        assert!(!err.has_field("productDescription"));
    }

    #[test]
    fn missing_fields_are_validated_not_rejected() {
        let request: CopyRequest =
            serde_json::from_value(serde_json::json!({ "productName": "Widget" }))
                .expect("deserialize");
        let err = request.validate().unwrap_err();
        assert!(err.has_field("productDescription"));
        assert!(err.has_field("targetAudience"));
    }
}
