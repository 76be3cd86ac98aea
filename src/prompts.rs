pub const OCR_EXTRACTION: &str = include_str!("../data/prompts/ocr_extraction.txt");
pub const POEM_ANALYSIS: &str = include_str!("../data/prompts/poem_analysis.txt");
pub const BACKGROUND_IMAGE: &str = include_str!("../data/prompts/background_image.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
