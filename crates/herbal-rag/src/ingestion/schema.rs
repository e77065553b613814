//! Extraction schemas, one per category

use crate::types::Category;

/// Value the model uses for fields absent from the source text
pub const NO_INFORMATION: &str = "chưa có thông tin";

/// One named field with the description shown to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Ordered field list plus category-specific instructions
#[derive(Debug)]
pub struct CategorySchema {
    pub category: Category,
    /// Extra instruction placed before the field list
    pub preamble: Option<&'static str>,
    pub fields: &'static [FieldSpec],
    /// Reminder to keep the entity name with every piece of content
    pub focus: &'static str,
}

const fn field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec { name, description }
}

static PLANT: CategorySchema = CategorySchema {
    category: Category::Plant,
    preamble: Some("Đọc tất cả dữ liệu và phát hiện được bệnh, mô tả, công dụng và hướng dẫn sử dụng"),
    fields: &[
        field("Tên - loài", "tên cây thuốc cũng là tên loài"),
        field("Tên khoa học/ tên tiếng anh", "tên khoa học hoặc tên tiếng anh"),
        field("Mô tả", "mô tả chi tiết"),
        field("Công dụng", "công dụng chính"),
        field(
            "Bệnh liên quan có thể chữa, điều trị hoặc hỗ trợ",
            "các bệnh có thể chữa, điều trị hoặc hỗ trợ",
        ),
        field("Hướng dẫn", "hướng dẫn sử dụng"),
        field("Tác dụng phụ", "tác dụng phụ nếu có"),
        field("Liều lượng", "liều lượng sử dụng"),
        field("Cách dùng", "cách sử dụng"),
        field("Lưu ý", "lưu ý khi sử dụng"),
        field("Đặc điểm", "đặc điểm của cây"),
        field("Phân bố", "khu vực phân bố"),
        field("Bộ phận dùng", "bộ phận được sử dụng"),
        field("Thu hái", "thời điểm và cách thu hái"),
        field("Bài thuốc", "các bài thuốc liên quan"),
        field("Chống chỉ định", "các trường hợp không nên dùng"),
        field("Tương tác", "tương tác với thuốc khác"),
        field("Dược tính", "tính chất dược lý"),
        field("Đối tượng", "đối tượng sử dụng"),
        field("Bảo quản", "cách bảo quản"),
        field("Bệnh lý", "các bệnh có thể điều trị"),
        field("Cập nhật", "thời gian cập nhật"),
        field("phân loại", "phân loại của cây thuốc theo ngành-lớp-bộ-họ-chi-loài"),
    ],
    focus: "Khi chia nhỏ thì luôn kèm theo tên của cây thuốc và bệnh được đề cập",
};

static DISEASE: CategorySchema = CategorySchema {
    category: Category::Disease,
    preamble: None,
    fields: &[
        field("Tên bệnh", "tên bệnh"),
        field("Triệu chứng", "các triệu chứng chính"),
        field("Nguyên nhân", "nguyên nhân gây bệnh"),
        field("Biến chứng", "các biến chứng có thể xảy ra"),
        field("Chẩn đoán", "phương pháp chẩn đoán"),
        field("Phòng ngừa", "cách phòng ngừa bệnh"),
        field("Mô tả", "mô tả chi tiết về bệnh"),
        field("Cây thuốc liên quan", "các cây thuốc được đề cập"),
        field("Điều trị", "phương pháp điều trị"),
        field("Thuốc điều trị", "các loại thuốc được sử dụng"),
        field("Tiên lượng", "tiên lượng bệnh"),
        field("Cập nhật", "thời gian cập nhật"),
    ],
    focus: "Khi chia nhỏ thì luôn kèm theo tên của bệnh được đề cập",
};

static ADVICE: CategorySchema = CategorySchema {
    category: Category::Advice,
    preamble: None,
    fields: &[
        field("Tiêu đề", "tiêu đề lời khuyên"),
        field("Nội dung", "nội dung chi tiết"),
        field("Chuyên môn", "chuyên môn của tác giả"),
        field("Cây thuốc liên quan", "các cây thuốc được đề cập"),
        field("Bệnh liên quan", "các bệnh được đề cập"),
        field("Lời khuyên", "các lời khuyên cụ thể"),
        field("Lưu ý", "các lưu ý quan trọng"),
        field("Cập nhật", "thời gian cập nhật"),
        field("Lời khuyên của chuyên gia", "tên của chuyên gia đưa ra lời khuyên"),
    ],
    focus: "Khi chia nhỏ thì luôn kèm theo tên của cây thuốc và tên chuyên gia đưa ra lời khuyên",
};

static USER: CategorySchema = CategorySchema {
    category: Category::User,
    preamble: None,
    fields: &[
        field("Họ tên", "họ và tên đầy đủ"),
        field("Email", "địa chỉ email"),
        field("Chức danh", "chức danh nghề nghiệp"),
        field("Chuyên môn", "chuyên môn chính"),
        field("Vai trò", "vai trò trong hệ thống"),
        field("Trạng thái", "trạng thái hoạt động"),
        field("Bằng cấp", "thông tin bằng cấp"),
        field("Kinh nghiệm", "kinh nghiệm làm việc"),
        field("Cập nhật", "thời gian cập nhật"),
    ],
    focus: "Khi chia nhỏ thì luôn kèm theo tên của người dùng được đề cập",
};

/// Schema for `category`
pub fn schema_for(category: Category) -> &'static CategorySchema {
    match category {
        Category::Plant => &PLANT,
        Category::Disease => &DISEASE,
        Category::Advice => &ADVICE,
        Category::User => &USER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_counts() {
        assert_eq!(schema_for(Category::Plant).fields.len(), 23);
        assert_eq!(schema_for(Category::Disease).fields.len(), 12);
        assert_eq!(schema_for(Category::Advice).fields.len(), 9);
        assert_eq!(schema_for(Category::User).fields.len(), 9);
    }

    #[test]
    fn test_name_key_is_a_schema_field() {
        for category in Category::ALL {
            let schema = schema_for(category);
            assert_eq!(schema.category, category);
            assert!(
                schema.fields.iter().any(|f| f.name == category.name_key()),
                "{} schema lacks its name key",
                category
            );
        }
    }
}
