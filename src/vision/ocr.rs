//! OCR result model
//!
//! Mirrors the JSON document returned by the recognition service:
//! regions contain lines, lines contain words, and every level carries a
//! `boundingBox` encoded as an `"x,y,w,h"` string.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use super::OcrError;

/// Axis-aligned box in the coordinate space of the uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

impl FromStr for BoundingBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid bounding box {:?}: {}", s, e))?;

        match values.as_slice() {
            &[x, y, width, height] => Ok(Self::new(x, y, width, height)),
            _ => Err(format!(
                "invalid bounding box {:?}: expected 4 values, got {}",
                s,
                values.len()
            )),
        }
    }
}

impl TryFrom<String> for BoundingBox {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Reported orientation of the text in the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Orientation {
    Up,
    Down,
    Left,
    Right,
    #[default]
    #[serde(other)]
    NotDetected,
}

impl Orientation {
    /// Correction in degrees added to the reported text angle
    pub fn adjustment_degrees(self) -> f64 {
        match self {
            Orientation::Left => -90.0,
            Orientation::Right => 90.0,
            Orientation::Down => 180.0,
            Orientation::Up | Orientation::NotDetected => 0.0,
        }
    }
}

/// A single recognized word
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub text: String,
    pub bounding_box: BoundingBox,
}

/// A line of words
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// A block of lines
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

/// Parsed recognition result for one photo
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default, deserialize_with = "deserialize_angle")]
    pub text_angle: Option<f64>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl OcrResult {
    /// All words in region, line, word order
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.regions
            .iter()
            .flat_map(|region| region.lines.iter())
            .flat_map(|line| line.words.iter())
    }

    /// Words whose text equals `keyword` exactly (case-sensitive)
    pub fn matches<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Word> {
        self.words().filter(move |word| word.text == keyword)
    }

    /// Text angle corrected by orientation, in degrees.
    ///
    /// `None` when the service reported no angle.
    pub fn rotation_degrees(&self) -> Option<f64> {
        self.text_angle
            .map(|angle| angle + self.orientation.adjustment_degrees())
    }

    /// Corrected text angle in radians
    pub fn rotation_radians(&self) -> Option<f64> {
        self.rotation_degrees().map(f64::to_radians)
    }
}

/// `textAngle` arrives as a number, but some clients serialize it as a string
fn deserialize_angle<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Angle {
        Number(f64),
        Text(String),
    }

    match Option::<Angle>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Angle::Number(value)) => Ok(Some(value)),
        Some(Angle::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid textAngle {:?}: {}", text, e))),
    }
}

/// Parse the service response body
pub fn parse_response(body: &str) -> Result<OcrResult, OcrError> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "language": "en",
        "textAngle": -2.0000000000000338,
        "orientation": "Up",
        "regions": [
            {
                "boundingBox": "21,16,304,451",
                "lines": [
                    {
                        "boundingBox": "28,16,288,41",
                        "words": [
                            { "boundingBox": "28,16,288,41", "text": "NOTHING" }
                        ]
                    },
                    {
                        "boundingBox": "27,66,283,52",
                        "words": [
                            { "boundingBox": "27,66,283,52", "text": "EXISTS" },
                            { "boundingBox": "100,200,50,60", "text": "keyword" }
                        ]
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_service_document() {
        let result = parse_response(SAMPLE).unwrap();

        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.orientation, Orientation::Up);
        assert!((result.text_angle.unwrap() + 2.0).abs() < 1e-9);
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].lines.len(), 2);

        let words: Vec<&str> = result.words().map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["NOTHING", "EXISTS", "keyword"]);
        assert_eq!(
            result.regions[0].lines[1].words[1].bounding_box,
            BoundingBox::new(100, 200, 50, 60)
        );
    }

    #[test]
    fn test_bounding_box_parsing() {
        assert_eq!("1, 2 ,3,4".parse::<BoundingBox>().unwrap(), BoundingBox::new(1, 2, 3, 4));
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("1,2,3,4,5".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert_eq!(BoundingBox::new(5, 6, 7, 8).to_string(), "5,6,7,8");
    }

    #[test]
    fn test_malformed_bounding_box_is_parse_error() {
        let body = r#"{"orientation":"Up","regions":[{"lines":[{"words":[{"text":"x","boundingBox":"1,2"}]}]}]}"#;
        assert!(matches!(parse_response(body), Err(OcrError::Parse(_))));
    }

    #[test]
    fn test_not_json_is_parse_error() {
        assert!(matches!(parse_response("<html>busy</html>"), Err(OcrError::Parse(_))));
    }

    #[test]
    fn test_missing_fields_default() {
        let result = parse_response("{}").unwrap();
        assert_eq!(result.orientation, Orientation::NotDetected);
        assert!(result.text_angle.is_none());
        assert!(result.regions.is_empty());
        assert_eq!(result.words().count(), 0);
    }

    #[test]
    fn test_unknown_orientation_is_not_detected() {
        let result = parse_response(r#"{"orientation":"Sideways","textAngle":5}"#).unwrap();
        assert_eq!(result.orientation, Orientation::NotDetected);
        assert_eq!(result.rotation_degrees(), Some(5.0));
    }

    #[test]
    fn test_text_angle_as_string() {
        let result = parse_response(r#"{"orientation":"Left","textAngle":"10"}"#).unwrap();
        assert_eq!(result.text_angle, Some(10.0));
        assert!(parse_response(r#"{"textAngle":"ten"}"#).is_err());
    }

    #[test]
    fn test_rotation_by_orientation() {
        let at = |orientation, angle: Option<f64>| OcrResult {
            orientation,
            text_angle: angle,
            ..Default::default()
        };

        assert_eq!(at(Orientation::Left, Some(10.0)).rotation_degrees(), Some(-80.0));
        assert_eq!(at(Orientation::Up, Some(10.0)).rotation_degrees(), Some(10.0));
        assert_eq!(at(Orientation::Right, Some(10.0)).rotation_degrees(), Some(100.0));
        assert_eq!(at(Orientation::Down, Some(10.0)).rotation_degrees(), Some(190.0));
        assert_eq!(at(Orientation::Left, None).rotation_degrees(), None);

        let radians = at(Orientation::Left, Some(10.0)).rotation_radians().unwrap();
        assert!((radians - (-80.0f64).to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let result = parse_response(
            r#"{"regions":[{"lines":[{"words":[
                {"text":"Keyword","boundingBox":"0,0,1,1"},
                {"text":"keyword","boundingBox":"2,2,1,1"}
            ]}]}]}"#,
        )
        .unwrap();

        let hits: Vec<_> = result.matches("keyword").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].bounding_box, BoundingBox::new(2, 2, 1, 1));
    }
}
