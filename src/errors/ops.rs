use std::fmt::{self, Display};

/// 张量的二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Mul,
    Div,
}
impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operation_name = match self {
            Self::Add => "相加",
            Self::AddAssign => "自相加",
            Self::Sub => "相减",
            Self::SubAssign => "自相减",
            Self::Mul => "相乘",
            Self::Div => "相除",
        };
        write!(f, "{operation_name}")
    }
}
