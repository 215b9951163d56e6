//! Test-only model clients and fixtures.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::gateway::client::{ModelClient, ModelError, ModelRequest};
use crate::schema::copy::CopyRequest;

/// Model client that replays scripted replies in order and records every
/// request it receives. Once the script runs out it fails with a transport
/// error.
#[derive(Default)]
pub struct ScriptedModelClient {
    replies: Mutex<VecDeque<Result<Value, ModelError>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModelClient {
    pub fn new(replies: impl IntoIterator<Item = Result<Value, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Client whose single reply is `value`.
    pub fn replying(value: Value) -> Self {
        Self::new([Ok(value)])
    }

    /// Client whose single reply is `err`.
    pub fn failing(err: ModelError) -> Self {
        Self::new([Err(err)])
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

impl ModelClient for ScriptedModelClient {
    fn generate(&self, request: &ModelRequest) -> Result<Value, ModelError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("no scripted reply left".to_string())))
    }
}

pub fn widget_copy_request() -> CopyRequest {
    CopyRequest {
        product_name: "Widget".to_string(),
        product_description: "A useful widget for home organization".to_string(),
        target_audience: "busy parents".to_string(),
    }
}

/// A conforming copy reply for [`widget_copy_request`].
pub fn widget_copy_reply() -> Value {
    json!({
        "facebookAd": {
            "headline": "Tame the clutter in minutes",
            "body": "Widget keeps keys, mail and chargers where busy parents can find them."
        },
        "googleAds": {
            "headlines": ["Clutter, Solved", "Home Order Made Easy", "Meet Widget"],
            "descriptions": [
                "Widget organizes the busiest corners of your home.",
                "Designed for parents who have no time to search."
            ]
        },
        "landingPage": {
            "heroTitle": "A calmer home starts with Widget",
            "heroSubtitle": "One small organizer for every everyday essential."
        },
        "email": {
            "subject": "Find your keys on the first try",
            "body": "Widget gives everything a place, so mornings run smoother."
        }
    })
}

pub const COFFEE_DESCRIPTION: &str =
    "A neighborhood coffee roaster selling single-origin beans online and at a small cafe.";

/// A conforming whole-plan reply for [`COFFEE_DESCRIPTION`].
pub fn coffee_plan_reply() -> Value {
    json!({
        "situationAnalysis": {
            "strengths": ["Single-origin sourcing", "Loyal local following"],
            "weaknesses": ["Small marketing budget"],
            "opportunities": ["Subscription boxes"],
            "threats": ["National chains"],
            "competitors": [
                { "name": "BigBrew", "analysis": "Cheap and everywhere, little story." }
            ]
        },
        "marketsAndCustomers": {
            "targetMarkets": ["Home baristas", "Remote workers"],
            "customerPersonas": [
                { "name": "Hobby Hannah", "description": "Weighs her beans and reads tasting notes." }
            ]
        },
        "stp": {
            "segmentation": ["Psychographic: coffee enthusiasts", "Geographic: within 5 miles"],
            "targeting": "Home baristas who value traceability.",
            "positioning": "The roaster that tells you exactly where every bean came from."
        },
        "directionAndObjectives": {
            "missionStatement": "Make exceptional coffee personal.",
            "visionStatement": "Every kitchen on the block brews our beans.",
            "objectives": [
                { "objective": "Grow subscriptions 20% in two quarters", "kpi": "Active subscriptions" }
            ]
        },
        "strategiesAndPrograms": {
            "marketingMix": {
                "product": ["Rotating single-origin lineup"],
                "price": ["Premium with subscription discount"],
                "place": ["Online shop", "Cafe counter"],
                "promotion": ["Tasting events", "Origin stories on social"]
            },
            "aidaCopy": {
                "attention": "Know your farmer.",
                "interest": "Each bag names the farm, altitude and harvest date.",
                "desire": "Taste the difference traceable beans make.",
                "action": "Start your first box today."
            }
        },
        "metricsAndControl": {
            "kpis": ["Customer acquisition cost", "Subscription churn"],
            "controlProcesses": ["Monthly marketing review"]
        }
    })
}

pub fn section_reply(text: &str) -> Value {
    json!({ "suggestions": text })
}
