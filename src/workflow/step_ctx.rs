//! 步骤上下文
//!
//! 封装"我正在处理第几本手稿"这一信息，只用于日志

use std::fmt::Display;

use crate::models::Resource;

#[derive(Debug, Clone)]
pub struct StepCtx {
    /// 手稿位置（从 0 开始）
    pub index: usize,
    /// 手稿总数
    pub total: usize,
    pub title: String,
}

impl StepCtx {
    pub fn new(resource: &Resource, total: usize) -> Self {
        Self {
            index: resource.order_index,
            total,
            title: resource.title.clone(),
        }
    }
}

impl Display for StepCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[手稿 {}/{} {}]", self.index + 1, self.total, self.title)
    }
}
