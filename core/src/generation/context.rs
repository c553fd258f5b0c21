use crate::model::GenerationRequest;

/// Natural-language instructions sent to the image model for a request.
pub fn build_context(request: &GenerationRequest) -> String {
    let mut lines = vec![
        "Generate a single photo-realistic, street-level photograph.".to_string(),
    ];

    if let Some(arrow) = &request.arrow {
        lines.push(format!(
            "The camera stands at latitude {:.5}, longitude {:.5} and looks toward bearing {:.0} degrees (0 = north, clockwise).",
            arrow.latitude, arrow.longitude, arrow.bearing_degrees
        ));
        lines.push(format!(
            "Frame roughly the first {:.0} meters of ground along that direction.",
            arrow.length_meters
        ));
    }

    let bounds = &request.map.bounds;
    lines.push(format!(
        "Visible map bounds: north {:.4}, south {:.4}, east {:.4}, west {:.4}; zoom {:.2}.",
        bounds.north, bounds.south, bounds.east, bounds.west, request.map.zoom
    ));
    lines.push(
        "An attached map preview, when present, shows the area with the viewing arrow drawn in red."
            .to_string(),
    );

    if let Some(caption) = request.caption() {
        lines.push(format!("Additional guidance from the user: {caption}"));
    }

    lines.join("\n")
}
