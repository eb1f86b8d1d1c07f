//! `#[core_async::test]` and `#[core_async::main]`.
//!
//! Both attributes turn an `async fn` into a synchronous one whose body runs
//! under `core_async::runtime::block_on`, so crates in the workspace never
//! need `#[tokio::test]` in their own dependency list.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, true)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, false)
}

fn expand(attr: TokenStream, item: TokenStream, is_test: bool) -> TokenStream {
    if !attr.is_empty() {
        let tokens = TokenStream2::from(attr);
        return syn::Error::new_spanned(tokens, "core_async attribute macros take no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sig = input.sig;
    sig.asyncness = None;

    let attrs = input.attrs;
    let vis = input.vis;
    let body = input.block;
    let test_attr = if is_test {
        quote!(#[test])
    } else {
        TokenStream2::new()
    };

    quote! {
        #(#attrs)*
        #test_attr
        #vis #sig {
            core_async::runtime::block_on(async move #body)
        }
    }
    .into()
}
