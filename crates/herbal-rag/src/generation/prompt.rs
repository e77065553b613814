//! Prompt templates for answering and structuring

use crate::ingestion::schema::{schema_for, NO_INFORMATION};
use crate::types::{Category, RetrievedPassage};

/// Prompt and response builder
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join the display text of every passage, rank order, blank-line separated
    pub fn build_context(passages: &[RetrievedPassage]) -> String {
        passages
            .iter()
            .map(RetrievedPassage::display_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the grounded answering prompt
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        format!(
            r#"
Bạn là một chuyên gia y học cổ truyền với kiến thức sâu rộng về cây thuốc, bệnh tật và phương pháp điều trị. Dưới đây là thông tin chi tiết từ cơ sở dữ liệu:

{context}

Hãy trả lời câu hỏi sau dựa trên thông tin được cung cấp:
Khi câu hỏi nói về cây có thể chữa bệnh hoặc bệnh có cây gì điều trị thì kết hợp nhiều dữ liệu được tìm thấy với nhau

Câu hỏi: {question}

Câu trả lời ít nhất 30 từ, chỉ trả lời thông tin được cung cấp, không sử dụng kiến thức bên ngoài.


Hãy đảm bảo câu trả lời của bạn đầy đủ, chính xác và hữu ích cho người đọc.
"#,
            context = context,
            question = question
        )
    }

    /// Answer shown when the model is unavailable: every passage verbatim, rank order
    pub fn build_fallback_response(passages: &[RetrievedPassage]) -> String {
        let mut response = String::from(
            "Hiện tại không thể truy cập được dịch vụ AI. Dưới đây là thông tin liên quan từ cơ sở dữ liệu:\n\n",
        );

        for (i, passage) in passages.iter().enumerate() {
            response.push_str(&format!(
                "--- Thông tin {} (nguồn: {}) ---\n",
                i + 1,
                passage.source()
            ));
            response.push_str(&passage.content);
            response.push_str("\n\n");
        }

        response.push_str("\nVui lòng thử lại sau hoặc liên hệ hỗ trợ nếu vấn đề vẫn tiếp tục.");
        response
    }

    /// Answer shown when retrieval itself failed
    pub fn build_error_response(error: &dyn std::fmt::Display) -> String {
        format!("Có lỗi xảy ra: {}", error)
    }

    /// Build the extraction prompt for one source document
    pub fn build_structuring_prompt(category: Category, text: &str) -> String {
        let schema = schema_for(category);

        let fields = schema
            .fields
            .iter()
            .map(|f| format!("    {}: {}", json_string(f.name), json_string(f.description)))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut prompt = String::from(
            "Hãy phân tích đoạn văn bản sau và trả về một JSON object duy nhất với các trường sau:\n",
        );
        if let Some(preamble) = schema.preamble {
            prompt.push_str(preamble);
            prompt.push('\n');
        }
        prompt.push_str(&format!("{{\n{}\n}}\n\n", fields));
        prompt.push_str(&format!(
            "Nếu một trường không có thông tin, hãy để giá trị là \"{}\".\n",
            NO_INFORMATION
        ));
        prompt.push_str("Chỉ sử dụng thông tin có trong đoạn văn bản, không thêm thông tin mới.\n");
        prompt.push_str(schema.focus);
        prompt.push_str("\n\nĐoạn văn bản:\n");
        prompt.push_str(text);
        prompt.push_str("\n\nTrả về JSON object duy nhất, không thêm text khác.\n");
        prompt
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn passage(content: &str, source: &str) -> RetrievedPassage {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from(source));
        RetrievedPassage::new(content, metadata)
    }

    #[test]
    fn test_build_context_keeps_rank_order() {
        let passages = vec![
            passage("Tên cây: Gừng: chống viêm", "a.txt"),
            passage("không nhãn", "b.txt"),
        ];
        assert_eq!(
            PromptBuilder::build_context(&passages),
            "Gừng: chống viêm\n\nkhông nhãn"
        );
    }

    #[test]
    fn test_answer_prompt_embeds_context_and_question() {
        let prompt = PromptBuilder::build_answer_prompt("cây nào chống viêm", "Gừng: chống viêm");
        assert!(prompt.contains("Gừng: chống viêm"));
        assert!(prompt.contains("Câu hỏi: cây nào chống viêm"));
        assert!(prompt.contains("ít nhất 30 từ"));
        assert!(prompt.contains("kết hợp nhiều dữ liệu"));
    }

    #[test]
    fn test_fallback_lists_sources_in_order() {
        let passages = vec![
            passage("Tên cây: Nghệ: kháng khuẩn", "data/plants/nghe.txt"),
            passage("Tên cây: Tỏi: hạ huyết áp", "data/plants/toi.txt"),
        ];
        let response = PromptBuilder::build_fallback_response(&passages);

        let first = response.find("Tên cây: Nghệ: kháng khuẩn").unwrap();
        let second = response.find("Tên cây: Tỏi: hạ huyết áp").unwrap();
        assert!(first < second);
        assert!(response.contains("--- Thông tin 1 (nguồn: data/plants/nghe.txt) ---"));
        assert!(response.contains("--- Thông tin 2 (nguồn: data/plants/toi.txt) ---"));
        assert!(response.starts_with("Hiện tại không thể truy cập"));
        assert!(response.ends_with("nếu vấn đề vẫn tiếp tục."));
    }

    #[test]
    fn test_structuring_prompt_lists_schema() {
        let prompt = PromptBuilder::build_structuring_prompt(Category::Disease, "Cảm cúm là ...");
        assert!(prompt.contains("\"Tên bệnh\": \"tên bệnh\""));
        assert!(prompt.contains("\"chưa có thông tin\""));
        assert!(prompt.contains("Đoạn văn bản:\nCảm cúm là ..."));
        assert!(prompt.trim_end().ends_with("không thêm text khác."));
    }
}
