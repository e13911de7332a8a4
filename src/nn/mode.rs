/// 网络的运行模式
///
/// - `Train`: BatchNorm 使用当前批次的统计量，Dropout 随机丢弃单元
/// - `Eval`: BatchNorm 使用滑动统计量，Dropout 不起作用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

impl Mode {
    pub const fn is_train(self) -> bool {
        matches!(self, Self::Train)
    }
}
