use crate::assets::color::ColorDef;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

/// Serde boundary for a whole scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDef {
    pub canvas: CanvasDef,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDef {
    /// Design-space width.
    pub width: f64,
    /// Design-space height.
    pub height: f64,
    #[serde(default)]
    pub background_type: BackgroundType,
    #[serde(default)]
    pub background: Option<ColorDef>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_video: Option<String>,
    #[serde(default = "one")]
    pub background_opacity: f64,
    #[serde(default)]
    pub background_fit: ImageFit,
    #[serde(default)]
    pub background_vignette: Option<VignetteDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
    Video,
}

/// How media is placed inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Fill the box, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the box, letterboxing.
    Contain,
    /// Stretch to the box.
    Fill,
    /// Natural size, centered.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VignetteDef {
    /// Edge darkening in `[0, 1]`.
    #[serde(default = "default_vignette_strength")]
    pub strength: f64,
    #[serde(default = "ColorDef::black")]
    pub color: ColorDef,
}

fn default_vignette_strength() -> f64 {
    0.5
}

/// One positioned element.
///
/// Geometry is in design space until the scaler maps it to device pixels; the scaled copy uses
/// the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise, about the element's own center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(flatten)]
    pub style: StyleDef,
    #[serde(flatten)]
    pub body: ElementBody,
}

impl ElementDef {
    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    /// Finite geometry with a non-negative size.
    pub fn has_usable_geometry(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation, self.opacity]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Repr::deserialize(deserializer)? {
        Repr::Str(s) => s,
        Repr::Int(i) => i.to_string(),
        Repr::Float(f) => f.to_string(),
    })
}

/// Box and text styling shared by every kind. Kinds ignore what they do not draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_font_weight",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_weight: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
    /// Values up to 4 are a multiplier of the font size, larger values are absolute pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
}

impl StyleDef {
    pub fn padding_x(&self) -> f64 {
        self.padding_x.or(self.padding).unwrap_or(0.0)
    }

    pub fn padding_y(&self) -> f64 {
        self.padding_y.or(self.padding).unwrap_or(0.0)
    }
}

fn de_font_weight<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Str(String),
    }
    let Some(repr) = Option::<Repr>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match repr {
        Repr::Num(n) => Ok(Some(n.clamp(1.0, 1000.0) as u16)),
        Repr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" => Ok(Some(400)),
            "medium" => Ok(Some(500)),
            "semibold" => Ok(Some(600)),
            "bold" => Ok(Some(700)),
            "light" => Ok(Some(300)),
            other => other
                .parse::<u16>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid fontWeight \"{s}\""))),
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Closed set of element kinds, the discriminant of [`ElementBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Text,
    Label,
    Arrow,
    Diamond,
    Triangle,
    Line,
    Circle,
    Rectangle,
    Pentagon,
    Hexagon,
    Star,
    Clock,
    Timer,
    Countdown,
    Image,
    AnimatedImage,
    Video,
    Slideshow,
    Weather,
    Ticker,
    Feed,
    Action,
    Button,
    Card,
}

impl ElementKind {
    pub const ALL: [ElementKind; 24] = [
        ElementKind::Text,
        ElementKind::Label,
        ElementKind::Arrow,
        ElementKind::Diamond,
        ElementKind::Triangle,
        ElementKind::Line,
        ElementKind::Circle,
        ElementKind::Rectangle,
        ElementKind::Pentagon,
        ElementKind::Hexagon,
        ElementKind::Star,
        ElementKind::Clock,
        ElementKind::Timer,
        ElementKind::Countdown,
        ElementKind::Image,
        ElementKind::AnimatedImage,
        ElementKind::Video,
        ElementKind::Slideshow,
        ElementKind::Weather,
        ElementKind::Ticker,
        ElementKind::Feed,
        ElementKind::Action,
        ElementKind::Button,
        ElementKind::Card,
    ];

    /// Content depends on the current time and repaints on the live tick.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Clock | Self::Timer | Self::Countdown)
    }

    /// Content is realized as an overlay node rather than raster pixels.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            Self::AnimatedImage | Self::Video | Self::Slideshow | Self::Ticker | Self::Feed
        )
    }

    /// Participates in focus navigation.
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Action | Self::Button | Self::Card)
    }

    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Arrow
                | Self::Diamond
                | Self::Triangle
                | Self::Line
                | Self::Circle
                | Self::Rectangle
                | Self::Pentagon
                | Self::Hexagon
                | Self::Star
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Label => "label",
            Self::Arrow => "arrow",
            Self::Diamond => "diamond",
            Self::Triangle => "triangle",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
            Self::Star => "star",
            Self::Clock => "clock",
            Self::Timer => "timer",
            Self::Countdown => "countdown",
            Self::Image => "image",
            Self::AnimatedImage => "animatedImage",
            Self::Video => "video",
            Self::Slideshow => "slideshow",
            Self::Weather => "weather",
            Self::Ticker => "ticker",
            Self::Feed => "feed",
            Self::Action => "action",
            Self::Button => "button",
            Self::Card => "card",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific payload, tagged by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementBody {
    Text(TextBody),
    Label(TextBody),
    Arrow(ShapeBody),
    Diamond(ShapeBody),
    Triangle(ShapeBody),
    Line(ShapeBody),
    #[serde(alias = "ellipse")]
    Circle(ShapeBody),
    #[serde(alias = "rect")]
    Rectangle(ShapeBody),
    Pentagon(ShapeBody),
    Hexagon(ShapeBody),
    Star(ShapeBody),
    Clock(ClockBody),
    Timer(TimerBody),
    Countdown(CountdownBody),
    Image(ImageBody),
    #[serde(alias = "gif")]
    AnimatedImage(ImageBody),
    Video(VideoBody),
    Slideshow(SlideshowBody),
    Weather(WeatherBody),
    #[serde(alias = "marquee")]
    Ticker(TickerBody),
    #[serde(alias = "rss")]
    Feed(FeedBody),
    Action(ActionBody),
    Button(ActionBody),
    Card(ActionBody),
}

impl ElementBody {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Text(_) => ElementKind::Text,
            Self::Label(_) => ElementKind::Label,
            Self::Arrow(_) => ElementKind::Arrow,
            Self::Diamond(_) => ElementKind::Diamond,
            Self::Triangle(_) => ElementKind::Triangle,
            Self::Line(_) => ElementKind::Line,
            Self::Circle(_) => ElementKind::Circle,
            Self::Rectangle(_) => ElementKind::Rectangle,
            Self::Pentagon(_) => ElementKind::Pentagon,
            Self::Hexagon(_) => ElementKind::Hexagon,
            Self::Star(_) => ElementKind::Star,
            Self::Clock(_) => ElementKind::Clock,
            Self::Timer(_) => ElementKind::Timer,
            Self::Countdown(_) => ElementKind::Countdown,
            Self::Image(_) => ElementKind::Image,
            Self::AnimatedImage(_) => ElementKind::AnimatedImage,
            Self::Video(_) => ElementKind::Video,
            Self::Slideshow(_) => ElementKind::Slideshow,
            Self::Weather(_) => ElementKind::Weather,
            Self::Ticker(_) => ElementKind::Ticker,
            Self::Feed(_) => ElementKind::Feed,
            Self::Action(_) => ElementKind::Action,
            Self::Button(_) => ElementKind::Button,
            Self::Card(_) => ElementKind::Card,
        }
    }

    pub fn shape(&self) -> Option<&ShapeBody> {
        match self {
            Self::Arrow(s)
            | Self::Diamond(s)
            | Self::Triangle(s)
            | Self::Line(s)
            | Self::Circle(s)
            | Self::Rectangle(s)
            | Self::Pentagon(s)
            | Self::Hexagon(s)
            | Self::Star(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn shape_mut(&mut self) -> Option<&mut ShapeBody> {
        match self {
            Self::Arrow(s)
            | Self::Diamond(s)
            | Self::Triangle(s)
            | Self::Line(s)
            | Self::Circle(s)
            | Self::Rectangle(s)
            | Self::Pentagon(s)
            | Self::Hexagon(s)
            | Self::Star(s) => Some(s),
            _ => None,
        }
    }

    /// Static or animated image source, if this is an image kind.
    pub fn image_source(&self) -> Option<&str> {
        match self {
            Self::Image(b) | Self::AnimatedImage(b) => Some(b.src.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBody {
    #[serde(default, alias = "text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<ColorDef>,
    #[serde(default)]
    pub stroke_width: f64,
    /// Star point count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    /// Star inner radius as a fraction of the outer radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius_ratio: Option<f64>,
    #[serde(default)]
    pub direction: ArrowDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    Digital,
    Analog,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HourFormat {
    #[default]
    #[serde(rename = "24h", alias = "24")]
    H24,
    #[serde(rename = "12h", alias = "12")]
    H12,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockBody {
    #[serde(default)]
    pub mode: ClockMode,
    #[serde(default)]
    pub format: HourFormat,
    #[serde(default = "yes")]
    pub show_seconds: bool,
    #[serde(default)]
    pub show_date: bool,
    /// Fixed display offset from UTC; the host's local offset when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_color: Option<ColorDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_hand_color: Option<ColorDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerBody {
    /// Counting starts here; scene activation when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimestampDef>,
    #[serde(default = "yes")]
    pub show_hours: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownBody {
    pub target_time: TimestampDef,
    #[serde(default = "default_completed_text")]
    pub completed_text: String,
    #[serde(default = "yes")]
    pub show_days: bool,
    #[serde(default)]
    pub show_labels: bool,
}

pub(crate) fn default_completed_text() -> String {
    "Time's up!".to_owned()
}

/// Instant given either as an RFC 3339 string or unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampDef(pub DateTime<Utc>);

impl Serialize for TimestampDef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for TimestampDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Millis(i64),
            Str(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .map(TimestampDef)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {ms}"))),
            Repr::Str(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| TimestampDef(dt.with_timezone(&Utc)))
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp \"{s}\": {e}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    #[serde(alias = "url")]
    pub src: String,
    #[serde(default)]
    pub fit: ImageFit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoBody {
    #[serde(alias = "url")]
    pub src: String,
    #[serde(default = "yes", rename = "loop")]
    pub looping: bool,
    #[serde(default = "yes")]
    pub muted: bool,
    #[serde(default = "yes")]
    pub autoplay: bool,
    #[serde(default)]
    pub fit: ImageFit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideTransition {
    #[default]
    Fade,
    Slide,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideshowBody {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_slide_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub transition: SlideTransition,
    #[serde(default)]
    pub fit: ImageFit,
}

fn default_slide_interval_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C", alias = "c", alias = "celsius")]
    Celsius,
    #[serde(rename = "F", alias = "f", alias = "fahrenheit")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }
}

/// Weather snapshot supplied by the host's data holder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherBody {
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub unit: TemperatureUnit,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerDirection {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerBody {
    #[serde(default, alias = "text")]
    pub content: String,
    /// Scroll speed in pixels per second.
    #[serde(default = "default_ticker_speed")]
    pub speed: f64,
    #[serde(default)]
    pub direction: TickerDirection,
}

fn default_ticker_speed() -> f64 {
    60.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItemDef {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedBody {
    #[serde(default)]
    pub items: Vec<FeedItemDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default = "default_feed_rotate_ms")]
    pub rotate_interval_ms: u64,
}

fn default_feed_rotate_ms() -> u64 {
    8_000
}

/// What activating an interactive element does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionDef {
    /// Launch an installed application by package name.
    LaunchApp { package: String },
    /// Fetch and render another template.
    #[serde(rename_all = "camelCase")]
    Template { template_id: String },
    /// Open a URL. Hosts currently only log this.
    Url { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBody {
    #[serde(default, alias = "label", alias = "title")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_color: Option<ColorDef>,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
