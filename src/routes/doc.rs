use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddCartItemRequest, CartDto, CartItemDto, UpdateCartItemRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        payments::{CreatePaymentIntentRequest, PaymentIntentResponse},
        products::{
            CategoryInput, CreateProductRequest, ProductDetail, ProductList, TagInput,
            UpdateProductRequest,
        },
        tags::{CreateTagRequest, TagList, UpdateTagRequest},
        wishlists::{CreateWishlistRequest, UpdateWishlistRequest, WishlistDto, WishlistList},
    },
    models::{Cart, CartItem, Category, Product, Tag, User, Wishlist},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, params, payments, products, tags, wishlists},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        tags::list_tags,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        cart::get_cart,
        cart::create_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        wishlists::list_wishlists,
        wishlists::create_wishlist,
        wishlists::get_wishlist,
        wishlists::update_wishlist,
        wishlists::delete_wishlist,
        payments::create_intent
    ),
    components(
        schemas(
            User,
            Tag,
            Category,
            Product,
            Cart,
            CartItem,
            Wishlist,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            TagInput,
            CategoryInput,
            CreateProductRequest,
            UpdateProductRequest,
            ProductDetail,
            ProductList,
            CreateTagRequest,
            UpdateTagRequest,
            TagList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartDto,
            CreateWishlistRequest,
            UpdateWishlistRequest,
            WishlistDto,
            WishlistList,
            CreatePaymentIntentRequest,
            PaymentIntentResponse,
            params::Pagination,
            params::ProductQuery,
            params::AssignedQuery,
            Meta,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<TagList>,
            ApiResponse<CategoryList>,
            ApiResponse<CartDto>,
            ApiResponse<WishlistList>,
            ApiResponse<PaymentIntentResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Tags", description = "Tag endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Wishlists", description = "Wishlist endpoints"),
        (name = "Payments", description = "Payment intent endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
