use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};


/// Derive macro to automatically implement the accessor traits every compartment
/// needs, `CurrentVoltage` and `Timestep`, the struct must have `current_voltage`
/// and `dt` fields and both traits must be in scope where the macro is used
#[proc_macro_derive(CompartmentBase)]
pub fn derive_compartment_traits(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    // Get the name of the struct we are deriving the trait for
    let name = input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    // Generate the implementation of the trait
    let expanded: proc_macro2::TokenStream = quote! {
        impl #impl_generics CurrentVoltage for #name #type_generics #where_clause {
            fn get_current_voltage(&self) -> f64 {
                self.current_voltage
            }
        }

        impl #impl_generics Timestep for #name #type_generics #where_clause {
            fn get_dt(&self) -> f64 {
                self.dt
            }

            fn set_dt(&mut self, dt: f64) {
                self.dt = dt;
            }
        }
    };

    TokenStream::from(expanded)
}
