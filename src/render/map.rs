use crate::affiliation::frequency::CountryFrequency;
use crate::prelude::*;
use crate::service::fetch_service::fetch_json;
use anyhow::anyhow;
use chrono::Local;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashSet, fs::write, path::Path};
use tera::{Context, Tera};

// ColorBrewer "Greens", 6 classes.
pub const GREENS: [&str; 6] = ["#edf8e9", "#c7e9c0", "#a1d99b", "#74c476", "#31a354", "#006d2c"];
pub const NAN_FILL_COLOR: &str = "black";
pub const FILL_OPACITY: f64 = 0.6;
pub const LINE_OPACITY: f64 = 1.0;
pub const CENTER: [f64; 2] = [0.0, 0.0];
pub const ZOOM_START: u8 = 2;

/// Equal-width bins over the observed count range.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethScale {
    edges: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub lower: String,
    pub upper: String,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
struct MapPage {
    title: String,
    generated_at: String,
    center: [f64; 2],
    zoom: u8,
    geojson: String,
    legend: Vec<LegendEntry>,
    nan_fill_color: &'static str,
    fill_opacity: f64,
    line_opacity: f64,
}

impl ChoroplethScale {
    pub fn new(min: u64, max: u64) -> Self {
        let (min, max) = (min as f64, max as f64);
        let classes = GREENS.len();
        let edges = (0..=classes)
            .map(|i| min + (max - min) * i as f64 / classes as f64)
            .collect();

        Self { edges }
    }

    pub fn from_frequency(frequency: &CountryFrequency) -> Option<Self> {
        frequency.min_max().map(|(min, max)| Self::new(min, max))
    }

    pub fn class_of(&self, value: u64) -> usize {
        let classes = GREENS.len();
        let min = self.edges[0];
        let max = self.edges[classes];
        if max <= min {
            return classes - 1;
        }

        let position = ((value as f64 - min) / (max - min) * classes as f64).floor();
        (position.max(0.0) as usize).min(classes - 1)
    }

    pub fn color_for(&self, value: u64) -> &'static str {
        GREENS[self.class_of(value)]
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.edges
            .windows(2)
            .zip(GREENS)
            .map(|(bounds, color)| LegendEntry {
                lower: format!("{:.1}", bounds[0]),
                upper: format!("{:.1}", bounds[1]),
                color,
            })
            .collect()
    }
}

/// Writes `count` and `fill_color` into each feature whose `name` has a count.
/// Returns the counted countries that matched no feature.
pub fn join_counts(
    geojson: &mut Value,
    frequency: &CountryFrequency,
    scale: Option<&ChoroplethScale>,
) -> Result<Vec<String>> {
    let features = match geojson.get_mut("features").and_then(Value::as_array_mut) {
        Some(features) => features,
        None => {
            let err = "GeoJSON has no features array";
            tracing::error!(err);
            return Err(anyhow!(err));
        }
    };

    let counts = frequency.to_map();
    let mut matched = HashSet::new();
    for feature in features.iter_mut() {
        let properties = match feature
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        {
            Some(properties) => properties,
            None => {
                tracing::debug!("Skipping GeoJSON feature without properties");
                continue;
            }
        };

        let name = match properties.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => {
                tracing::debug!("Skipping GeoJSON feature without a name");
                continue;
            }
        };

        match (counts.get(name.as_str()), scale) {
            (Some(&count), Some(scale)) => {
                properties.insert("count".to_string(), Value::from(count));
                properties.insert("fill_color".to_string(), Value::from(scale.color_for(count)));
                matched.insert(name);
            }
            _ => {
                properties.insert("count".to_string(), Value::Null);
                properties.insert("fill_color".to_string(), Value::Null);
            }
        }
    }

    let unmatched: Vec<String> = frequency
        .counts()
        .iter()
        .filter(|entry| !matched.contains(&entry.countries))
        .map(|entry| entry.countries.clone())
        .collect();

    Ok(unmatched)
}

pub fn render_map_html(geojson: &Value, scale: Option<&ChoroplethScale>) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("map.html", MAP_TEMPLATE)?;

    let page = MapPage {
        title: "Scientific production by country".to_string(),
        generated_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        center: CENTER,
        zoom: ZOOM_START,
        geojson: serde_json::to_string(geojson)?.replace("</", "<\\/"),
        legend: scale.map(ChoroplethScale::legend).unwrap_or_default(),
        nan_fill_color: NAN_FILL_COLOR,
        fill_opacity: FILL_OPACITY,
        line_opacity: LINE_OPACITY,
    };

    let mut context = Context::new();
    context.insert("page", &page);

    Ok(tera.render("map.html", &context)?)
}

pub async fn plot_world_map(
    client: &Client,
    geojson_url: &str,
    frequency: &CountryFrequency,
    map_path: &Path,
) -> Result<()> {
    let mut geojson = fetch_json(client, geojson_url).await?;
    let scale = ChoroplethScale::from_frequency(frequency);
    let unmatched = join_counts(&mut geojson, frequency, scale.as_ref())?;
    for country in &unmatched {
        tracing::warn!("No polygon named {} in the world map, leaving it unfilled", country);
    }

    let html = render_map_html(&geojson, scale.as_ref())?;
    write(map_path, html)?;
    tracing::info!(
        "Wrote map with {} of {} countries to {}",
        frequency.len() - unmatched.len(),
        frequency.len(),
        map_path.display()
    );

    Ok(())
}

const MAP_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ page.title }}</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        html, body { width: 100%; height: 100%; margin: 0; padding: 0; }
        #map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }
        .legend {
            background: rgba(255, 255, 255, 0.9);
            padding: 6px 10px;
            font: 12px/18px sans-serif;
            border-radius: 4px;
        }
        .legend i { display: inline-block; width: 18px; height: 12px; margin-right: 6px; opacity: {{ page.fill_opacity }}; }
    </style>
</head>
<body>
    <div id="map"></div>
    <script>
        var map = L.map("map").setView([{{ page.center.0 }}, {{ page.center.1 }}], {{ page.zoom }});
        L.tileLayer("https://tile.openstreetmap.org/{z}/{x}/{y}.png", {
            maxZoom: 19,
            attribution: "&copy; OpenStreetMap contributors"
        }).addTo(map);

        var countries = {{ page.geojson | safe }};
        L.geoJson(countries, {
            style: function (feature) {
                var fill = feature.properties.fill_color;
                return {
                    color: "black",
                    weight: 1,
                    opacity: {{ page.line_opacity }},
                    fillColor: fill === null ? "{{ page.nan_fill_color }}" : fill,
                    fillOpacity: {{ page.fill_opacity }}
                };
            },
            onEachFeature: function (feature, layer) {
                var count = feature.properties.count;
                if (count !== null) {
                    layer.bindTooltip(feature.properties.name + ": " + count);
                }
            }
        }).addTo(map);

        var legend = L.control({ position: "topright" });
        legend.onAdd = function () {
            var div = L.DomUtil.create("div", "legend");
            div.innerHTML = "<strong>Publications</strong><br>"
{%- for entry in page.legend %}
                + '<i style="background: {{ entry.color }}"></i>{{ entry.lower }} &ndash; {{ entry.upper }}<br>'
{%- endfor %}
                + "<small>{{ page.generated_at }}</small>";
            return div;
        };
        legend.addTo(map);
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn frequency(entries: &[(&str, u64)]) -> CountryFrequency {
        CountryFrequency::from_counts(
            entries
                .iter()
                .map(|(country, count)| (country.to_string(), *count))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn world() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "Chile" }, "geometry": null },
                { "type": "Feature", "properties": { "name": "United States of America" }, "geometry": null },
                { "type": "Feature", "properties": { "name": "Peru" }, "geometry": null },
                { "type": "Feature", "geometry": null }
            ]
        })
    }

    #[test]
    fn maximum_falls_in_last_class() {
        let scale = ChoroplethScale::new(1, 13);

        assert_eq!(scale.legend().len(), 6);
        assert_eq!(scale.class_of(1), 0);
        assert_eq!(scale.class_of(3), 1);
        assert_eq!(scale.class_of(13), 5);
        assert_eq!(scale.color_for(13), "#006d2c");
    }

    #[test]
    fn single_distinct_count_uses_last_class() {
        let scale = ChoroplethScale::new(4, 4);

        assert_eq!(scale.class_of(4), 5);
    }

    #[test]
    fn joins_counts_on_feature_name() {
        let frequency = frequency(&[("United States of America", 10), ("Chile", 1), ("Atlantis", 3)]);
        let scale = ChoroplethScale::from_frequency(&frequency).unwrap();
        let mut geojson = world();

        let unmatched = join_counts(&mut geojson, &frequency, Some(&scale)).unwrap();

        assert_eq!(unmatched, vec!["Atlantis".to_string()]);
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features[0]["properties"]["count"], json!(1));
        assert_eq!(features[0]["properties"]["fill_color"], json!("#edf8e9"));
        assert_eq!(features[1]["properties"]["count"], json!(10));
        assert_eq!(features[1]["properties"]["fill_color"], json!("#006d2c"));
        assert_eq!(features[2]["properties"]["count"], Value::Null);
    }

    #[test]
    fn geojson_without_features_is_an_error() {
        let mut geojson = json!({ "type": "Feature" });

        assert!(join_counts(&mut geojson, &frequency(&[("Chile", 1)]), None).is_err());
    }

    #[test]
    fn renders_a_leaflet_page_with_embedded_data() {
        let frequency = frequency(&[("Chile", 2), ("Peru", 1)]);
        let scale = ChoroplethScale::from_frequency(&frequency).unwrap();
        let mut geojson = world();
        join_counts(&mut geojson, &frequency, Some(&scale)).unwrap();

        let html = render_map_html(&geojson, Some(&scale)).unwrap();

        assert!(html.contains("leaflet.js"));
        assert!(html.contains("L.map(\"map\").setView(["));
        assert!(html.contains("\"fill_color\":\"#006d2c\""));
        assert!(html.contains("background: #edf8e9"));
        assert!(html.contains("1.0 &ndash; 1.2"));
    }

    #[test]
    fn renders_without_counts() {
        let mut geojson = world();
        join_counts(&mut geojson, &CountryFrequency::default(), None).unwrap();

        let html = render_map_html(&geojson, None).unwrap();

        assert!(html.contains("\"count\":null"));
    }
}
