//! Derive macros for `mc-protocol` packet schemas.
//!
//! Mirrors the mechanical field traversal described by the protocol's
//! packet schema: a struct's field list *is* its wire layout, in
//! declaration order. `#[derive(Encode, Decode, Packet)]` generates the
//! pack/unpack code a hand-written reflection-based schema would otherwise
//! build at runtime.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields};

#[proc_macro_derive(Encode)]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(s) => encode_fields(&s.fields),
        _ => {
            return syn::Error::new_spanned(&input, "Encode can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    quote! {
        impl #impl_generics mc_protocol::Encode for #name #ty_generics #where_clause {
            fn encode(&self, w: &mut impl ::std::io::Write) -> ::std::result::Result<(), mc_protocol::EncodeError> {
                #body
                Ok(())
            }
        }
    }
    .into()
}

fn encode_fields(fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(named) => {
            let stmts = named.named.iter().map(|f| {
                let ident = f.ident.as_ref().expect("named field");
                quote! { mc_protocol::Encode::encode(&self.#ident, w)?; }
            });
            quote! { #(#stmts)* }
        }
        Fields::Unnamed(unnamed) => {
            let stmts = (0..unnamed.unnamed.len()).map(|i| {
                let idx = syn::Index::from(i);
                quote! { mc_protocol::Encode::encode(&self.#idx, w)?; }
            });
            quote! { #(#stmts)* }
        }
        Fields::Unit => quote! {},
    }
}

#[proc_macro_derive(Decode)]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(s) => decode_fields(name, &s.fields),
        _ => {
            return syn::Error::new_spanned(&input, "Decode can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    quote! {
        impl #impl_generics mc_protocol::Decode for #name #ty_generics #where_clause {
            fn decode(r: &mut &[u8]) -> ::std::result::Result<Self, mc_protocol::DecodeError> {
                #body
            }
        }
    }
    .into()
}

fn decode_fields(name: &syn::Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().map(|f| f.ident.clone().unwrap()).collect();
            let binds = idents.iter().map(|ident| {
                quote! { let #ident = mc_protocol::Decode::decode(r)?; }
            });
            quote! {
                #(#binds)*
                Ok(#name { #(#idents),* })
            }
        }
        Fields::Unnamed(unnamed) => {
            let binds = (0..unnamed.unnamed.len()).map(|i| {
                let var = quote::format_ident!("f{i}");
                quote! { let #var = mc_protocol::Decode::decode(r)?; }
            });
            let vars = (0..unnamed.unnamed.len()).map(|i| quote::format_ident!("f{i}"));
            quote! {
                #(#binds)*
                Ok(#name(#(#vars),*))
            }
        }
        Fields::Unit => quote! { Ok(#name) },
    }
}

struct PacketAttr {
    id: Expr,
    state: Expr,
    side: Expr,
}

fn parse_packet_attr(input: &DeriveInput) -> syn::Result<PacketAttr> {
    let attr = input
        .attrs
        .iter()
        .find(|a| a.path().is_ident("packet"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                input,
                "Packet derive requires #[packet(id = .., state = .., side = ..)]",
            )
        })?;

    let mut id = None;
    let mut state = None;
    let mut side = None;

    attr.parse_nested_meta(|meta| {
        let value = meta.value()?;
        let expr: Expr = value.parse()?;
        if meta.path.is_ident("id") {
            id = Some(expr);
        } else if meta.path.is_ident("state") {
            state = Some(expr);
        } else if meta.path.is_ident("side") {
            side = Some(expr);
        } else {
            return Err(meta.error("unknown packet attribute key"));
        }
        Ok(())
    })?;

    Ok(PacketAttr {
        id: id.ok_or_else(|| syn::Error::new_spanned(attr, "missing `id = ..`"))?,
        state: state.ok_or_else(|| syn::Error::new_spanned(attr, "missing `state = ..`"))?,
        side: side.ok_or_else(|| syn::Error::new_spanned(attr, "missing `side = ..`"))?,
    })
}

#[proc_macro_derive(Packet, attributes(packet))]
pub fn derive_packet(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let attr = match parse_packet_attr(&input) {
        Ok(a) => a,
        Err(e) => return e.to_compile_error().into(),
    };

    let PacketAttr { id, state, side } = attr;

    quote! {
        impl #impl_generics mc_protocol::Packet for #name #ty_generics #where_clause {
            const ID: i32 = #id;
            const NAME: &'static str = #name_str;
            const SIDE: mc_protocol::PacketSide = #side;
            const STATE: mc_protocol::PacketState = #state;
        }
    }
    .into()
}
