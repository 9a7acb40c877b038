//! Synchronous system descriptors

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{SignalProbe, require};
use crate::collector::environment::{
    Capability, Environment, NavigatorInfo, ScreenInfo, TimezoneInfo,
};
use crate::collector::signal::ProbeUnavailable;

/// (feature name, property, value) pairs checked via `CSS.supports`
const CSS_FEATURES: &[(&str, &str, &str)] = &[
    ("grid", "display", "grid"),
    ("subgrid", "grid-template-columns", "subgrid"),
    ("flexGap", "gap", "1px"),
    ("containerQueries", "container-type", "inline-size"),
    ("backdropFilter", "backdrop-filter", "blur(1px)"),
    ("aspectRatio", "aspect-ratio", "1 / 1"),
    ("colorMix", "color", "color-mix(in srgb, red, blue)"),
    ("hasSelector", "selector(:has(a))", ""),
];

pub struct NavigatorProbe;

#[async_trait]
impl SignalProbe for NavigatorProbe {
    type Output = NavigatorInfo;

    fn name(&self) -> &'static str {
        "navigator"
    }

    async fn read(&self, env: &dyn Environment) -> Result<NavigatorInfo, ProbeUnavailable> {
        require(env, Capability::Navigator, "navigator")?;
        env.navigator()
            .ok_or_else(|| ProbeUnavailable::failed("navigator object missing"))
    }
}

pub struct ScreenProbe;

#[async_trait]
impl SignalProbe for ScreenProbe {
    type Output = ScreenInfo;

    fn name(&self) -> &'static str {
        "screen"
    }

    async fn read(&self, env: &dyn Environment) -> Result<ScreenInfo, ProbeUnavailable> {
        require(env, Capability::Screen, "screen")?;
        env.screen()
            .ok_or_else(|| ProbeUnavailable::failed("screen object missing"))
    }
}

pub struct TimezoneProbe;

#[async_trait]
impl SignalProbe for TimezoneProbe {
    type Output = TimezoneInfo;

    fn name(&self) -> &'static str {
        "timezone"
    }

    async fn read(&self, env: &dyn Environment) -> Result<TimezoneInfo, ProbeUnavailable> {
        require(env, Capability::Timezone, "timezone")?;
        env.timezone()
            .ok_or_else(|| ProbeUnavailable::failed("timezone unresolved"))
    }
}

/// Feature name → supported; features the environment cannot answer are left out
pub struct CssFeaturesProbe;

#[async_trait]
impl SignalProbe for CssFeaturesProbe {
    type Output = BTreeMap<String, bool>;

    fn name(&self) -> &'static str {
        "cssFeatures"
    }

    async fn read(&self, env: &dyn Environment) -> Result<Self::Output, ProbeUnavailable> {
        require(env, Capability::CssSupports, "CSS.supports")?;

        let features: BTreeMap<String, bool> = CSS_FEATURES
            .iter()
            .filter_map(|(name, property, value)| {
                env.css_supports(property, value)
                    .map(|supported| (name.to_string(), supported))
            })
            .collect();

        if features.is_empty() {
            return Err(ProbeUnavailable::failed("no CSS feature could be checked"));
        }
        Ok(features)
    }
}
