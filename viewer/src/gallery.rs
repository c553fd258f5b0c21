use crate::Message;
use chrono::DateTime;
use iced::{
    widget::{button, column, image, row, svg, text, Column},
    Element, Length,
};
use viewpointcore::model::{GenerationResult, InlineImage};

const THUMB_WIDTH: f32 = 300.0;
const PREVIEW_WIDTH: f32 = 140.0;

/// Decoded image ready for display.
#[derive(Clone)]
pub enum Picture {
    Raster(image::Handle),
    Vector(svg::Handle),
    Unavailable,
}

impl Picture {
    pub fn from_data_url(url: &str) -> Self {
        let Some(inline) = InlineImage::from_data_url(url) else {
            return Picture::Unavailable;
        };
        let Some(bytes) = inline.decode() else {
            return Picture::Unavailable;
        };
        if inline.mime_type == "image/svg+xml" {
            Picture::Vector(svg::Handle::from_memory(bytes))
        } else {
            Picture::Raster(image::Handle::from_bytes(bytes))
        }
    }

    fn view(&self, width: f32) -> Element<'_, Message> {
        match self {
            Picture::Raster(handle) => image(handle.clone()).width(Length::Fixed(width)).into(),
            Picture::Vector(handle) => svg(handle.clone()).width(Length::Fixed(width)).into(),
            Picture::Unavailable => text("Image unavailable").size(12).into(),
        }
    }
}

/// One history entry with its images decoded up front.
pub struct GalleryItem {
    pub id: String,
    pub heading: String,
    pub details: String,
    pub generated: Picture,
    pub preview: Option<Picture>,
}

impl GalleryItem {
    pub fn from_result(result: &GenerationResult) -> Self {
        let created = DateTime::from_timestamp_millis(result.created_at)
            .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown time".into());
        let heading = result
            .request
            .caption()
            .map(str::to_string)
            .unwrap_or_else(|| "Untitled view".into());
        let arrow = result
            .request
            .arrow
            .map(|arrow| {
                format!(
                    "{:.5}, {:.5} | {:.0}° | {:.0} m",
                    arrow.latitude, arrow.longitude, arrow.bearing_degrees, arrow.length_meters
                )
            })
            .unwrap_or_else(|| "no arrow".into());
        let model = result.model_identifier.as_deref().unwrap_or("unknown model");
        let mut details = format!("{created} | {model}\n{arrow}");
        if let Some(labels) = result.safety_labels.as_ref().filter(|labels| !labels.is_empty()) {
            details.push_str(&format!("\nSafety: {}", labels.join(", ")));
        }

        Self {
            id: result.id.clone(),
            heading,
            details,
            generated: Picture::from_data_url(&result.generated_image),
            preview: result
                .map_snapshot_image
                .as_deref()
                .map(Picture::from_data_url),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let mut images = row![self.generated.view(THUMB_WIDTH)].spacing(8);
        if let Some(preview) = &self.preview {
            images = images.push(preview.view(PREVIEW_WIDTH));
        }
        column![
            text(&self.heading).size(16),
            images,
            text(&self.details).size(12),
            button("Remove")
                .on_press(Message::RemoveEntry(self.id.clone()))
                .padding(4),
        ]
        .spacing(6)
        .padding(8)
        .into()
    }
}

pub fn build(entries: &[GenerationResult]) -> Vec<GalleryItem> {
    entries.iter().map(GalleryItem::from_result).collect()
}

pub fn view(items: &[GalleryItem]) -> Column<'_, Message> {
    if items.is_empty() {
        return Column::new().push(text("No generated views yet").size(12));
    }
    items
        .iter()
        .fold(Column::new().spacing(12), |col, item| col.push(item.view()))
}
