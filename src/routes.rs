pub mod auth;
pub mod routes;

pub mod health {
    pub mod health_handlers;
}

pub mod user {
    pub mod user_handlers;
    pub mod user_models;
}

pub mod recipe {
    pub mod recipe_handlers;
    pub mod recipe_models;
}

pub mod tag {
    pub mod tag_handlers;
    pub mod tag_models;
}
