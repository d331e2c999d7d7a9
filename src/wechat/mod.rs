//! WeChat mini-program login: trades a `wx.login()` code for the user's openid.

mod client;
mod dto;

pub use client::{IdentityProvider, WeChatClient};
