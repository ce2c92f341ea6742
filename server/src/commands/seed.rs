use db::cooking::{MealType, Recipe, RecipeFields, RecipeTag, TagList};
use db::users::User;
use tracing::info;

use crate::Result;

struct DemoRecipe {
    author: &'static str,
    title: &'static str,
    description: &'static str,
    ingredients: &'static str,
    instructions: &'static str,
    prep_time: i32,
    cook_time: i32,
    servings: i32,
    meal_type: MealType,
    tags: &'static [RecipeTag],
}

const DEMO_RECIPES: &[DemoRecipe] = &[
    DemoRecipe {
        author: "maria",
        title: "Margherita Pizza",
        description: "Thin crust, San Marzano tomatoes and fresh basil.",
        ingredients: "500g pizza dough\n200g crushed tomatoes\n150g fresh mozzarella\nFresh basil\nOlive oil",
        instructions: "1. Heat the oven as hot as it goes\n2. Stretch the dough\n3. Top with tomato and mozzarella\n4. Bake for 8 minutes\n5. Finish with basil and olive oil",
        prep_time: 20,
        cook_time: 10,
        servings: 2,
        meal_type: MealType::Dinner,
        tags: &[RecipeTag::Italian, RecipeTag::Pizza, RecipeTag::Vegetarian],
    },
    DemoRecipe {
        author: "maria",
        title: "Overnight Oats",
        description: "Make it the night before, eat it on the way out.",
        ingredients: "1 cup rolled oats\n1 cup milk\n2 tbsp yoghurt\n1 tbsp honey\nBerries",
        instructions: "1. Stir everything except the berries together\n2. Refrigerate overnight\n3. Top with berries",
        prep_time: 5,
        cook_time: 0,
        servings: 1,
        meal_type: MealType::Breakfast,
        tags: &[RecipeTag::Healthy, RecipeTag::Vegetarian],
    },
    DemoRecipe {
        author: "tom",
        title: "Chicken Tikka Masala",
        description: "A weeknight version of the takeaway favourite.",
        ingredients: "600g chicken thighs\n200g yoghurt\n2 tbsp tikka paste\n1 onion\n400g chopped tomatoes\n100ml cream",
        instructions: "1. Marinate the chicken in yoghurt and paste\n2. Grill until charred\n3. Soften the onion and add tomatoes\n4. Simmer with the chicken and cream",
        prep_time: 30,
        cook_time: 40,
        servings: 4,
        meal_type: MealType::Dinner,
        tags: &[RecipeTag::Indian, RecipeTag::Chicken],
    },
    DemoRecipe {
        author: "tom",
        title: "Minestrone Soup",
        description: "Whatever vegetables are in the fridge, plus pasta.",
        ingredients: "1 onion\n2 carrots\n2 celery sticks\n400g chopped tomatoes\n1 litre stock\n100g small pasta",
        instructions: "1. Sweat the diced vegetables\n2. Add tomatoes and stock\n3. Simmer for 20 minutes\n4. Add the pasta and cook until tender",
        prep_time: 15,
        cook_time: 35,
        servings: 6,
        meal_type: MealType::Lunch,
        tags: &[RecipeTag::Italian, RecipeTag::Soup, RecipeTag::Vegan],
    },
    DemoRecipe {
        author: "tom",
        title: "Guacamole",
        description: "",
        ingredients: "3 ripe avocados\n1 lime\n1 small red onion\n1 chilli\nCoriander\nSalt",
        instructions: "1. Mash the avocados\n2. Stir in everything else\n3. Season with lime and salt",
        prep_time: 10,
        cook_time: 0,
        servings: 4,
        meal_type: MealType::Snacks,
        tags: &[RecipeTag::Mexican, RecipeTag::Vegan, RecipeTag::GlutenFree],
    },
    DemoRecipe {
        author: "maria",
        title: "Lemon Drizzle Cake",
        description: "Sharp, sticky and gone within a day.",
        ingredients: "225g butter\n225g caster sugar\n4 eggs\n225g self-raising flour\n2 lemons\n85g granulated sugar",
        instructions: "1. Cream the butter and sugar\n2. Beat in the eggs and zest\n3. Fold in the flour\n4. Bake for 45 minutes\n5. Pour over lemon juice mixed with sugar",
        prep_time: 20,
        cook_time: 45,
        servings: 10,
        meal_type: MealType::Dessert,
        tags: &[RecipeTag::Baking],
    },
];

pub(crate) async fn seed() -> Result<()> {
    let pool = super::db_from_env().await?;

    if Recipe::count(&pool).await? > 0 {
        info!("Recipes already exist, skipping seed");

        return Ok(());
    }

    info!("Seeding demo recipes");

    for demo in DEMO_RECIPES {
        let author = User::get_or_create_by_username(&pool, demo.author).await?;
        let fields = RecipeFields {
            title: demo.title.to_string(),
            description: demo.description.to_string(),
            ingredients: demo.ingredients.to_string(),
            instructions: demo.instructions.to_string(),
            prep_time: demo.prep_time,
            cook_time: demo.cook_time,
            servings: demo.servings,
            image_url: None,
            meal_type: demo.meal_type,
            tags: TagList::from_tags(demo.tags.iter().copied()),
        };

        Recipe::create(&pool, author.user_id, &fields).await?;
    }

    info!(count = DEMO_RECIPES.len(), "Seeded demo recipes");

    Ok(())
}
