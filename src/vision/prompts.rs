use super::types::{DetailLevel, QueryType, SearchType};

const ANALYZE_LOW_PROMPT: &str =
    "Briefly describe this image in two or three sentences. Focus on the main subject.";

const ANALYZE_HIGH_PROMPT: &str = "Describe this image in detail. Cover the scene and setting, \
the main subjects and what they are doing, colors and lighting, composition, and the overall \
mood.";

const ANALYZE_AUTO_PROMPT: &str =
    "Describe this image. Use as much detail as the content warrants.";

const OBJECTS_INSTRUCTION: &str = "After the description, add a line containing only \
\"Objects:\" followed by a bulleted list of the distinct objects you can see, one per line, \
in the form \"- label (NN%)\" where NN is your confidence.";

const OCR_PROMPT: &str = "Extract all text visible in this image. Return only the extracted \
text, with no commentary. If there is no text, return an empty response.";

const PRESERVE_FORMATTING_INSTRUCTION: &str = "Preserve the original layout: keep line breaks, \
indentation, lists, and table structure as they appear in the image.";

pub(crate) const DEFAULT_CHAT_PROMPT: &str = "What do you see in this image?";

pub fn analyze_prompt(detail: DetailLevel, detect_objects: bool) -> String {
    let base = match detail {
        DetailLevel::Low => ANALYZE_LOW_PROMPT,
        DetailLevel::High => ANALYZE_HIGH_PROMPT,
        DetailLevel::Auto => ANALYZE_AUTO_PROMPT,
    };

    if detect_objects {
        format!("{base}\n\n{OBJECTS_INSTRUCTION}")
    } else {
        base.to_string()
    }
}

pub fn ocr_prompt(language: &str, preserve_formatting: bool) -> String {
    let mut prompt = OCR_PROMPT.to_string();

    let language = language.trim();
    if !language.is_empty() && !language.eq_ignore_ascii_case("auto") {
        prompt.push_str(&format!(" The text is in {language}."));
    }

    if preserve_formatting {
        prompt.push(' ');
        prompt.push_str(PRESERVE_FORMATTING_INSTRUCTION);
    }

    prompt
}

pub fn search_prompt(search_type: SearchType, max_results: u32) -> String {
    match search_type {
        SearchType::Web => format!(
            "Identify what this image shows and write the web search query you would use to \
             learn more about it. Then list up to {max_results} topics worth searching for."
        ),
        SearchType::Products => format!(
            "Identify any products in this image, including brand, model, and category where \
             visible. Write a shopping search query for them and list up to {max_results} \
             comparable products."
        ),
        SearchType::Similar => format!(
            "Describe the visual style, subject, and composition of this image as a search \
             query for finding similar images. List up to {max_results} keywords."
        ),
    }
}

pub fn web_search_prompt(query_type: QueryType, max_results: u32) -> String {
    match query_type {
        QueryType::Information => format!(
            "Analyze this image and explain what it shows: the subject, its context, and any \
             notable facts. Suggest up to {max_results} questions someone might research \
             about it."
        ),
        QueryType::Shopping => format!(
            "Analyze this image for shopping. Identify the items shown, their likely price \
             range, and where they might be bought. Suggest up to {max_results} alternatives."
        ),
        QueryType::Entertainment => format!(
            "Analyze this image for entertainment content. Identify any movies, shows, games, \
             artists, or characters it relates to. Suggest up to {max_results} related titles."
        ),
    }
}
