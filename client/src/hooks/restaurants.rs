use shared::{Restaurant, RestaurantFormData};
use uuid::Uuid;

use super::keys::{restaurant_key, restaurants_key};
use super::{SommelierClient, Target};
use crate::mutation::{Mutation, MutationKind};
use crate::query::{fetcher, Query};

impl SommelierClient {
    /// The restaurant list has no required parameters, so it is never idle
    pub fn restaurants(&self) -> Query<Vec<Restaurant>> {
        let api = self.api.clone();
        self.query(Some((
            restaurants_key(),
            fetcher(move || {
                let api = api.clone();
                async move { api.list_restaurants().await }
            }),
        )))
    }

    pub fn restaurant_target(&self, restaurant_id: Option<Uuid>) -> Target<Restaurant> {
        let restaurant_id = restaurant_id?;
        let api = self.api.clone();
        Some((
            restaurant_key(restaurant_id),
            fetcher(move || {
                let api = api.clone();
                async move { api.get_restaurant(restaurant_id).await }
            }),
        ))
    }

    pub fn restaurant(&self, restaurant_id: Option<Uuid>) -> Query<Restaurant> {
        self.query(self.restaurant_target(restaurant_id))
    }

    pub fn create_restaurant(&self) -> Mutation<RestaurantFormData, Restaurant> {
        self.mutation(
            MutationKind::CreateRestaurant,
            |api, restaurant: RestaurantFormData| async move {
                api.create_restaurant(&restaurant).await
            },
        )
    }
}
