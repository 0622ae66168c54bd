use std::collections::HashMap;
use crate::binlog::binlog_events_wrapper::{BinlogEventsHolderRef};

// 定义一个函数签名，用于注册的函数
pub type Callback = fn(BinlogEventsHolderRef, usize) -> bool;

// 定义函数注册表结构
pub struct FunctionRegistry {
    callbacks: HashMap<&'static str, Callback>,
}

impl FunctionRegistry {
    /// 创建一个新的函数注册表
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// 注册函数
    pub fn register_function(&mut self, name: &'static str, callback: fn(BinlogEventsHolderRef, usize) -> bool) {
        self.callbacks.insert(name, callback);
    }

    /// 调用已注册的函数
    pub fn call_function(&self, name: &'static str, arg: BinlogEventsHolderRef, step: usize) -> Option<bool> {
        if let Some(callback) = self.callbacks.get(name) {
            Some(callback(arg, step))
        } else {
            None
        }
    }
}
